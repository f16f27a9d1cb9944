use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::gateway_factory::GatewayFactory;
use super::provider_http::str_field;
use crate::core::{AppError, Result};
use crate::modules::gateways::models::{GatewayKind, PaymentStatus};

/// Keys providers use for the payment identifier, in lookup order
const PAYMENT_ID_KEYS: [&str; 4] = ["payment_id", "transaction_id", "id", "paymentId"];

/// Result of a processed provider callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookOutcome {
    pub message: String,
    pub gateway: GatewayKind,
    pub payment_id: String,
    pub status: PaymentStatus,
}

/// Handles asynchronous provider callbacks
///
/// Callbacks are never trusted for the payment status: the payment is
/// re-verified against the provider before the outcome is reported.
#[derive(Clone)]
pub struct WebhookHandler {
    factory: Arc<GatewayFactory>,
}

impl WebhookHandler {
    pub fn new(factory: Arc<GatewayFactory>) -> Self {
        Self { factory }
    }

    pub async fn process_webhook(
        &self,
        user_agent: Option<&str>,
        payload: &Value,
    ) -> Result<WebhookOutcome> {
        let gateway = resolve_gateway(user_agent, payload)?;
        let payment_id = extract_payment_id(payload)?;

        info!(
            gateway = %gateway,
            payment_id = %payment_id,
            "Payment webhook received"
        );

        let verification = self
            .factory
            .verify_payment(gateway.id(), &payment_id)
            .await
            .inspect_err(|e| {
                warn!(gateway = %gateway, payment_id = %payment_id, error = %e, "Webhook verification failed");
            })?;

        Ok(WebhookOutcome {
            message: "Webhook processed successfully".to_string(),
            gateway,
            payment_id,
            status: verification.status,
        })
    }
}

/// Work out which gateway sent a callback
///
/// PSE and Nequi identify themselves in the User-Agent; other providers are
/// expected to name themselves in a `gateway` or `source` body field.
pub fn resolve_gateway(user_agent: Option<&str>, payload: &Value) -> Result<GatewayKind> {
    if let Some(agent) = user_agent {
        if agent.contains("PSE") {
            return Ok(GatewayKind::Pse);
        }
        if agent.contains("Nequi") {
            return Ok(GatewayKind::Nequi);
        }
    }

    ["gateway", "source"]
        .iter()
        .find_map(|key| payload.get(key).and_then(Value::as_str))
        .ok_or_else(|| AppError::validation("Cannot determine gateway type"))?
        .parse()
}

/// Payment identifier carried by a callback, as a string
///
/// MercadoPago nests it under `data.id`; other providers use a top-level key.
pub fn extract_payment_id(payload: &Value) -> Result<String> {
    if let Some(id) = payload.get("data").and_then(|data| str_field(data, "id")) {
        return Ok(id);
    }

    PAYMENT_ID_KEYS
        .iter()
        .find_map(|key| str_field(payload, key))
        .ok_or_else(|| AppError::validation("Payment ID not found in webhook"))
}
