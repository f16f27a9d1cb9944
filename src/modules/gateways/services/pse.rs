use super::gateway_trait::PaymentGateway;
use super::provider_http::{self, donation_reference, minor_units_field, str_field};
use crate::config::PseConfig;
use crate::core::{to_minor_units, AppError, Result};
use crate::modules::gateways::models::{
    DonationPaymentData, GatewayKind, PaymentResult, PaymentStatus, PaymentVerification,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{error, info, warn};

const SANDBOX_URL: &str = "https://sandbox.pse.com.co/api";
const PRODUCTION_URL: &str = "https://api.pse.com.co/api";

/// PSE (Pagos Seguros en Línea) bank redirect gateway, Colombia
///
/// The donor is redirected to PSE to pick a bank; amounts travel in cents.
pub struct PseGateway {
    client: Client,
    config: PseConfig,
    base_url: String,
}

impl PseGateway {
    pub fn new(config: PseConfig, client: Client) -> Self {
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

    /// Map PSE transaction states onto the shared status
    pub fn map_status(pse_status: &str) -> PaymentStatus {
        match pse_status.to_lowercase().as_str() {
            "approved" | "completed" => PaymentStatus::Completed,
            "pending" | "processing" => PaymentStatus::Pending,
            "declined" | "failed" => PaymentStatus::Failed,
            "cancelled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }

    pub(crate) fn payment_body(
        &self,
        donation: &DonationPaymentData,
        reference: &str,
    ) -> Result<Value> {
        let amount = to_minor_units(donation.amount).map_err(AppError::validation)?;
        let currency = if donation.currency.trim().is_empty() {
            "COP"
        } else {
            donation.currency.as_str()
        };

        Ok(json!({
            "merchant_id": self.config.merchant_id,
            "amount": amount,
            "currency": currency,
            "description": donation.description(),
            "customer_name": donation.donor_name,
            "customer_email": donation.donor_email,
            "customer_phone": donation.donor_phone,
            "return_url": donation.return_url,
            "webhook_url": self.config.webhook_url,
            "reference": reference,
            "metadata": {
                "church_id": donation.church_id,
                "category_id": donation.category_id,
                "notes": donation.notes
            }
        }))
    }

    async fn create_payment(&self, donation: &DonationPaymentData) -> Result<PaymentResult> {
        donation.validate()?;

        let reference = donation_reference("DON");
        let body = self.payment_body(donation, &reference)?;

        let response = provider_http::send(
            self.name(),
            self.client
                .post(format!("{}/payments", self.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&body),
        )
        .await?;

        let payment_url = str_field(&response.body, "payment_url");
        match (response.is_success(), payment_url) {
            (true, Some(payment_url)) => {
                let payment_id = str_field(&response.body, "payment_id").unwrap_or(reference);
                info!(
                    gateway = "pse",
                    payment_id = %payment_id,
                    church_id = %donation.church_id,
                    "PSE payment created"
                );
                Ok(PaymentResult::redirect(payment_id, payment_url, response.body))
            }
            _ => {
                warn!(
                    gateway = "pse",
                    status = %response.status,
                    "PSE rejected payment"
                );
                Ok(response.rejection("PSE payment could not be processed"))
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for PseGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Pse
    }

    fn name(&self) -> &str {
        "PSE"
    }

    async fn process_payment(&self, donation: &DonationPaymentData) -> PaymentResult {
        match self.create_payment(donation).await {
            Ok(result) => result,
            Err(AppError::Validation(msg)) => PaymentResult::failure(msg, None),
            Err(e) => {
                error!(gateway = "pse", error = %e, "PSE payment error");
                PaymentResult::failure("Could not connect to PSE", None)
            }
        }
    }

    async fn verify_payment(&self, payment_id: &str) -> PaymentVerification {
        let lookup = async {
            let url = provider_http::endpoint(&self.base_url, &["payments", payment_id])?;
            provider_http::send(self.name(), self.client.get(url).bearer_auth(&self.config.api_key)).await
        };

        match lookup.await {
            Ok(response) => {
                if !response.is_success() {
                    warn!(gateway = "pse", payment_id, status = %response.status, "PSE status lookup rejected");
                }
                let status = response
                    .body
                    .get("status")
                    .and_then(Value::as_str)
                    .map(Self::map_status)
                    .unwrap_or(PaymentStatus::Pending);

                PaymentVerification {
                    status,
                    payment_id: payment_id.to_string(),
                    amount: minor_units_field(&response.body, "amount"),
                    currency: str_field(&response.body, "currency"),
                    gateway_response: Some(response.body),
                }
            }
            Err(e) => {
                error!(gateway = "pse", payment_id, error = %e, "PSE verify error");
                PaymentVerification::unreachable(payment_id)
            }
        }
    }
}
