use crate::core::{AppError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Donation to be charged through one of the payment gateways
///
/// Built by the caller for a single payment attempt and consumed once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationPaymentData {
    /// Amount in major units (e.g. 10.50)
    pub amount: Decimal,

    /// ISO currency code as sent by the donor form
    pub currency: String,

    pub donor_name: String,
    pub donor_email: String,

    #[serde(default)]
    pub donor_phone: Option<String>,

    /// Tenant church receiving the donation
    pub church_id: String,

    /// Donation category (tithe, offering, campaign...)
    pub category_id: String,

    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub is_recurring: Option<bool>,

    /// Where redirect-based gateways send the donor back to
    pub return_url: String,
}

impl DonationPaymentData {
    /// Reject donations no provider could charge
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(AppError::validation("Donation amount must be greater than 0"));
        }

        let required = [
            ("donor_name", &self.donor_name),
            ("donor_email", &self.donor_email),
            ("church_id", &self.church_id),
            ("category_id", &self.category_id),
            ("return_url", &self.return_url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{} is required", field)));
            }
        }

        if !self.donor_email.contains('@') {
            return Err(AppError::validation("donor_email is not a valid email address"));
        }

        Ok(())
    }

    /// Line description shown on the provider checkout
    pub fn description(&self) -> String {
        format!("Donación - {}", self.church_id)
    }
}
