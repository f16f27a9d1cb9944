use super::gateway_trait::PaymentGateway;
use super::provider_http::{self, minor_units_field, str_field};
use crate::config::ConektaConfig;
use crate::core::{to_minor_units, AppError, Result};
use crate::modules::gateways::models::{
    DonationPaymentData, GatewayKind, PaymentInstructions, PaymentResult, PaymentStatus,
    PaymentVerification,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::{error, info, warn};

const SANDBOX_URL: &str = "https://sandbox.conekta.io/v2";
const PRODUCTION_URL: &str = "https://api.conekta.io/v2";
const ACCEPT_HEADER: &str = "application/vnd.conekta-v2.0.0+json";

/// Hours a SPEI reference or OXXO voucher stays payable
const REFERENCE_EXPIRATION_HOURS: i64 = 72;

/// Conekta payment method behind a Mexican gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConektaMethod {
    /// SPEI interbank transfer to a generated CLABE
    Spei,
    /// Cash payment at OXXO stores
    OxxoCash,
}

impl ConektaMethod {
    fn payment_type(&self) -> &'static str {
        match self {
            ConektaMethod::Spei => "spei",
            ConektaMethod::OxxoCash => "oxxo_cash",
        }
    }
}

/// Mexican gateways (SPEI and OXXO) backed by Conekta orders
///
/// Both produce a payable reference instead of a redirect; amounts travel in
/// centavos and the order is always in MXN.
pub struct ConektaGateway {
    client: Client,
    config: ConektaConfig,
    base_url: String,
    method: ConektaMethod,
}

impl ConektaGateway {
    pub fn new(config: ConektaConfig, method: ConektaMethod, client: Client) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| config.environment.select(SANDBOX_URL, PRODUCTION_URL).to_string());

        Self {
            client,
            config,
            base_url,
            method,
        }
    }

    pub fn spei(config: ConektaConfig, client: Client) -> Self {
        Self::new(config, ConektaMethod::Spei, client)
    }

    pub fn oxxo(config: ConektaConfig, client: Client) -> Self {
        Self::new(config, ConektaMethod::OxxoCash, client)
    }

    /// Map Conekta order payment states onto the shared status
    pub fn map_status(order_status: &str) -> PaymentStatus {
        match order_status.to_lowercase().as_str() {
            "paid" => PaymentStatus::Completed,
            "pending_payment" => PaymentStatus::Pending,
            "expired" | "canceled" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.config.api_key)
            .header("Accept", ACCEPT_HEADER)
    }

    pub(crate) fn order_body(
        &self,
        donation: &DonationPaymentData,
        expires_at: DateTime<Utc>,
    ) -> Result<Value> {
        let unit_price = to_minor_units(donation.amount).map_err(AppError::validation)?;

        Ok(json!({
            "currency": "MXN",
            "customer_info": {
                "name": donation.donor_name,
                "email": donation.donor_email,
                "phone": donation.donor_phone
            },
            "line_items": [{
                "name": donation.description(),
                "unit_price": unit_price,
                "quantity": 1
            }],
            "charges": [{
                "payment_method": {
                    "type": self.method.payment_type(),
                    "expires_at": expires_at.timestamp()
                }
            }],
            "metadata": {
                "church_id": donation.church_id,
                "category_id": donation.category_id,
                "notes": donation.notes
            }
        }))
    }

    fn instructions(&self, payment_method: &Value) -> PaymentInstructions {
        let expires_at = payment_method
            .get("expires_at")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));

        match self.method {
            ConektaMethod::Spei => PaymentInstructions::BankTransfer {
                clabe: str_field(payment_method, "clabe"),
                bank: str_field(payment_method, "bank"),
                reference: str_field(payment_method, "reference"),
                expires_at,
            },
            ConektaMethod::OxxoCash => PaymentInstructions::CashVoucher {
                reference: str_field(payment_method, "reference"),
                barcode_url: str_field(payment_method, "barcode_url"),
                expires_at,
            },
        }
    }

    async fn create_order(&self, donation: &DonationPaymentData) -> Result<PaymentResult> {
        donation.validate()?;

        let expires_at = Utc::now() + Duration::hours(REFERENCE_EXPIRATION_HOURS);
        let body = self.order_body(donation, expires_at)?;

        let response = provider_http::send(
            self.name(),
            self.authorized(self.client.post(format!("{}/orders", self.base_url)))
                .json(&body),
        )
        .await?;

        let payment_method = response
            .body
            .pointer("/charges/data/0/payment_method")
            .filter(|pm| pm.is_object())
            .cloned();

        match (
            response.is_success(),
            str_field(&response.body, "id"),
            payment_method,
        ) {
            (true, Some(order_id), Some(payment_method)) => {
                let instructions = self.instructions(&payment_method);
                info!(
                    gateway = %self.kind(),
                    payment_id = %order_id,
                    church_id = %donation.church_id,
                    "Conekta order created"
                );
                Ok(PaymentResult::with_instructions(order_id, instructions, response.body))
            }
            _ => {
                warn!(gateway = %self.kind(), status = %response.status, "Conekta rejected order");
                let default_message = format!("{} payment could not be processed", self.name());
                Ok(response.rejection(&default_message))
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for ConektaGateway {
    fn kind(&self) -> GatewayKind {
        match self.method {
            ConektaMethod::Spei => GatewayKind::Spei,
            ConektaMethod::OxxoCash => GatewayKind::Oxxo,
        }
    }

    fn name(&self) -> &str {
        match self.method {
            ConektaMethod::Spei => "SPEI",
            ConektaMethod::OxxoCash => "OXXO",
        }
    }

    async fn process_payment(&self, donation: &DonationPaymentData) -> PaymentResult {
        match self.create_order(donation).await {
            Ok(result) => result,
            Err(AppError::Validation(msg)) => PaymentResult::failure(msg, None),
            Err(e) => {
                error!(gateway = %self.kind(), error = %e, "Conekta payment error");
                PaymentResult::failure(format!("Could not connect to {}", self.name()), None)
            }
        }
    }

    async fn verify_payment(&self, payment_id: &str) -> PaymentVerification {
        let lookup = async {
            let url = provider_http::endpoint(&self.base_url, &["orders", payment_id])?;
            provider_http::send(self.name(), self.authorized(self.client.get(url))).await
        };

        match lookup.await {
            Ok(response) => {
                if !response.is_success() {
                    warn!(gateway = %self.kind(), payment_id, status = %response.status, "Conekta order lookup rejected");
                }
                let status = response
                    .body
                    .get("payment_status")
                    .and_then(Value::as_str)
                    .map(Self::map_status)
                    .unwrap_or(PaymentStatus::Pending);

                PaymentVerification {
                    status,
                    payment_id: payment_id.to_string(),
                    amount: minor_units_field(&response.body, "amount"),
                    currency: Some("MXN".to_string()),
                    gateway_response: Some(response.body),
                }
            }
            Err(e) => {
                error!(gateway = %self.kind(), payment_id, error = %e, "Conekta verify error");
                PaymentVerification::unreachable(payment_id)
            }
        }
    }
}
