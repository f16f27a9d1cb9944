use super::gateway_trait::PaymentGateway;
use super::provider_http::{self, donation_reference, minor_units_field, str_field};
use crate::config::NequiConfig;
use crate::core::{to_minor_units, AppError, Result};
use crate::modules::gateways::models::{
    DonationPaymentData, GatewayKind, PaymentResult, PaymentStatus, PaymentVerification,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

const SANDBOX_URL: &str = "https://sandbox.nequi.com/api";
const PRODUCTION_URL: &str = "https://api.nequi.com/api";

/// Nequi mobile wallet gateway, Colombia
///
/// Every call first exchanges the client credentials for an OAuth token;
/// tokens are not cached. Payments are pushed to the donor's phone, so there
/// is no redirect URL.
pub struct NequiGateway {
    client: Client,
    config: NequiConfig,
    base_url: String,
}

impl NequiGateway {
    pub fn new(config: NequiConfig, client: Client) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| config.environment.select(SANDBOX_URL, PRODUCTION_URL).to_string());

        Self {
            client,
            config,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map Nequi transaction states onto the shared status
    pub fn map_status(nequi_status: &str) -> PaymentStatus {
        match nequi_status.to_lowercase().as_str() {
            "successful" | "approved" => PaymentStatus::Completed,
            "pending" => PaymentStatus::Pending,
            "declined" | "failed" => PaymentStatus::Failed,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }

    /// Client-credentials token exchange
    async fn access_token(&self) -> Result<String> {
        let request = self
            .client
            .post(format!("{}/oauth/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ]);

        let response = provider_http::send(self.name(), request).await?;

        debug!(gateway = "nequi", status = %response.status, "Nequi token response");
        str_field(&response.body, "access_token")
            .ok_or_else(|| AppError::gateway("Failed to get Nequi access token"))
    }

    pub(crate) fn payment_body(
        &self,
        donation: &DonationPaymentData,
        reference: &str,
    ) -> Result<Value> {
        let amount = to_minor_units(donation.amount).map_err(AppError::validation)?;

        Ok(json!({
            "amount": amount,
            "description": donation.description(),
            "phone_number": donation.donor_phone,
            "callback_url": self.config.webhook_url,
            "reference": reference,
            "metadata": {
                "church_id": donation.church_id,
                "category_id": donation.category_id,
                "donor_name": donation.donor_name,
                "donor_email": donation.donor_email
            }
        }))
    }

    async fn push_payment(&self, donation: &DonationPaymentData) -> Result<PaymentResult> {
        donation.validate()?;
        if donation
            .donor_phone
            .as_deref()
            .map_or(true, |phone| phone.trim().is_empty())
        {
            return Err(AppError::validation(
                "donor_phone is required for Nequi payments",
            ));
        }

        let body = self.payment_body(donation, &donation_reference("DON-NEQ"))?;
        let token = self.access_token().await?;

        let response = provider_http::send(
            self.name(),
            self.client
                .post(format!("{}/payments/push", self.base_url))
                .bearer_auth(token)
                .json(&body),
        )
        .await?;

        match (
            response.is_success(),
            str_field(&response.body, "transaction_id"),
        ) {
            (true, Some(transaction_id)) => {
                info!(
                    gateway = "nequi",
                    payment_id = %transaction_id,
                    church_id = %donation.church_id,
                    "Nequi push payment sent"
                );
                Ok(PaymentResult::accepted(transaction_id, response.body))
            }
            _ => {
                warn!(gateway = "nequi", status = %response.status, "Nequi rejected payment");
                Ok(response.rejection("Nequi payment could not be processed"))
            }
        }
    }

    async fn fetch_status(&self, payment_id: &str) -> Result<PaymentVerification> {
        let url = provider_http::endpoint(&self.base_url, &["payments", payment_id])?;
        let token = self.access_token().await?;
        let response =
            provider_http::send(self.name(), self.client.get(url).bearer_auth(token)).await?;

        if !response.is_success() {
            warn!(gateway = "nequi", payment_id, status = %response.status, "Nequi status lookup rejected");
        }

        let status = response
            .body
            .get("status")
            .and_then(Value::as_str)
            .map(Self::map_status)
            .unwrap_or(PaymentStatus::Pending);

        Ok(PaymentVerification {
            status,
            payment_id: payment_id.to_string(),
            amount: minor_units_field(&response.body, "amount"),
            currency: Some("COP".to_string()),
            gateway_response: Some(response.body),
        })
    }
}

#[async_trait]
impl PaymentGateway for NequiGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Nequi
    }

    fn name(&self) -> &str {
        "Nequi"
    }

    async fn process_payment(&self, donation: &DonationPaymentData) -> PaymentResult {
        match self.push_payment(donation).await {
            Ok(result) => result,
            Err(AppError::Validation(msg)) => PaymentResult::failure(msg, None),
            Err(e) => {
                error!(gateway = "nequi", error = %e, "Nequi payment error");
                PaymentResult::failure("Could not connect to Nequi", None)
            }
        }
    }

    async fn verify_payment(&self, payment_id: &str) -> PaymentVerification {
        match self.fetch_status(payment_id).await {
            Ok(verification) => verification,
            Err(e) => {
                error!(gateway = "nequi", payment_id, error = %e, "Nequi verify error");
                PaymentVerification::unreachable(payment_id)
            }
        }
    }
}
