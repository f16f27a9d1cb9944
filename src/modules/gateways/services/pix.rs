use super::gateway_trait::PaymentGateway;
use super::provider_http::{self, str_field};
use crate::config::PixConfig;
use crate::core::{AppError, Result};
use crate::modules::gateways::models::{
    DonationPaymentData, GatewayKind, PaymentInstructions, PaymentResult, PaymentStatus,
    PaymentVerification,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::{error, info, warn};

const SANDBOX_URL: &str = "https://sandbox.pix.com.br/api/v2";
const PRODUCTION_URL: &str = "https://api.pix.com.br/api/v2";

/// Seconds a PIX charge stays payable
const CHARGE_EXPIRATION_SECS: i64 = 3600;

/// PIX instant payment gateway, Brazil
///
/// Creates an immediate charge (`cob`) against the church's PIX key and
/// hands back the "copia e cola" payload for the donor to scan.
pub struct PixGateway {
    client: Client,
    config: PixConfig,
    base_url: String,
}

impl PixGateway {
    pub fn new(config: PixConfig, client: Client) -> Self {
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

    /// Map BACEN charge states onto the shared status
    pub fn map_status(pix_status: &str) -> PaymentStatus {
        match pix_status.to_uppercase().as_str() {
            "CONCLUIDA" => PaymentStatus::Completed,
            "ATIVA" => PaymentStatus::Pending,
            "REMOVIDA_PELO_PSP" => PaymentStatus::Failed,
            "REMOVIDA_PELO_USUARIO_RECEBEDOR" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }

    pub(crate) fn charge_body(&self, donation: &DonationPaymentData) -> Value {
        let mut info = vec![
            json!({"nome": "church_id", "valor": donation.church_id}),
            json!({"nome": "category_id", "valor": donation.category_id}),
        ];
        if let Some(notes) = donation.notes.as_deref().filter(|n| !n.is_empty()) {
            info.push(json!({"nome": "notes", "valor": notes}));
        }

        json!({
            "calendario": { "expiracao": CHARGE_EXPIRATION_SECS },
            "devedor": { "nome": donation.donor_name },
            "valor": { "original": format!("{:.2}", original_amount(donation.amount)) },
            "chave": self.config.pix_key,
            "solicitacaoPagador": donation.description(),
            "infoAdicionais": info
        })
    }

    async fn create_charge(&self, donation: &DonationPaymentData) -> Result<PaymentResult> {
        donation.validate()?;
        if !donation.currency.trim().is_empty() && !donation.currency.eq_ignore_ascii_case("BRL") {
            return Err(AppError::validation("PIX only accepts BRL donations"));
        }

        let requested_at = Utc::now();
        let response = provider_http::send(
            self.name(),
            self.client
                .post(format!("{}/cob", self.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&self.charge_body(donation)),
        )
        .await?;

        match (
            response.is_success(),
            str_field(&response.body, "txid"),
            str_field(&response.body, "pixCopiaECola"),
        ) {
            (true, Some(txid), Some(qr_code)) => {
                let expires_at = charge_expiry(&response.body).unwrap_or_else(|| {
                    requested_at + Duration::seconds(CHARGE_EXPIRATION_SECS)
                });
                let instructions = PaymentInstructions::PixQrCode {
                    qr_code,
                    location: str_field(&response.body, "location"),
                    expires_at,
                };

                info!(
                    gateway = "pix",
                    payment_id = %txid,
                    church_id = %donation.church_id,
                    "PIX charge created"
                );
                Ok(PaymentResult::with_instructions(txid, instructions, response.body))
            }
            _ => {
                warn!(gateway = "pix", status = %response.status, "PIX rejected charge");
                Ok(response.rejection("PIX payment could not be processed"))
            }
        }
    }
}

/// Expiry derived from the charge's `calendario.criacao` + `expiracao`
fn charge_expiry(charge: &Value) -> Option<DateTime<Utc>> {
    let calendar = charge.get("calendario")?;
    let created = calendar.get("criacao")?.as_str()?;
    let created = DateTime::parse_from_rfc3339(created).ok()?.with_timezone(&Utc);
    let seconds = calendar
        .get("expiracao")
        .and_then(Value::as_i64)
        .unwrap_or(CHARGE_EXPIRATION_SECS);
    Some(created + Duration::seconds(seconds))
}

#[async_trait]
impl PaymentGateway for PixGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Pix
    }

    fn name(&self) -> &str {
        "PIX"
    }

    async fn process_payment(&self, donation: &DonationPaymentData) -> PaymentResult {
        match self.create_charge(donation).await {
            Ok(result) => result,
            Err(AppError::Validation(msg)) => PaymentResult::failure(msg, None),
            Err(e) => {
                error!(gateway = "pix", error = %e, "PIX payment error");
                PaymentResult::failure("Could not connect to PIX", None)
            }
        }
    }

    async fn verify_payment(&self, payment_id: &str) -> PaymentVerification {
        let lookup = async {
            let url = provider_http::endpoint(&self.base_url, &["cob", payment_id])?;
            provider_http::send(self.name(), self.client.get(url).bearer_auth(&self.config.api_key)).await
        };

        match lookup.await {
            Ok(response) => {
                if !response.is_success() {
                    warn!(gateway = "pix", payment_id, status = %response.status, "PIX status lookup rejected");
                }
                let status = response
                    .body
                    .get("status")
                    .and_then(Value::as_str)
                    .map(Self::map_status)
                    .unwrap_or(PaymentStatus::Pending);
                let amount = response
                    .body
                    .pointer("/valor/original")
                    .and_then(Value::as_str)
                    .and_then(|v| Decimal::from_str(v).ok());

                PaymentVerification {
                    status,
                    payment_id: payment_id.to_string(),
                    amount,
                    currency: Some("BRL".to_string()),
                    gateway_response: Some(response.body),
                }
            }
            Err(e) => {
                error!(gateway = "pix", payment_id, error = %e, "PIX verify error");
                PaymentVerification::unreachable(payment_id)
            }
        }
    }
}

/// Centavos for `valor.original`, half cents rounding away from zero
fn original_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
