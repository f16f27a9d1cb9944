use crate::core::{from_minor_units, AppError, Result};
use crate::modules::gateways::models::PaymentResult;
use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode, Url};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Provider reply with its body parsed leniently
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ProviderResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Provider supplied error message, if any
    pub fn message(&self) -> Option<String> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Failure result for a provider rejection, keeping the raw body for audit
    pub fn rejection(self, default_message: &str) -> PaymentResult {
        let message = self
            .message()
            .unwrap_or_else(|| default_message.to_string());
        PaymentResult::failure(message, Some(self.body))
    }
}

/// Send a request and read the reply body as JSON
///
/// Non-JSON bodies are kept as a JSON string and empty bodies as null, so a
/// provider error page never turns into a parse failure.
pub async fn send(gateway: &str, request: RequestBuilder) -> Result<ProviderResponse> {
    let response = request.send().await.map_err(|e| {
        if e.is_connect() || e.is_timeout() {
            AppError::gateway(format!(
                "{} gateway unavailable: {} ({})",
                gateway,
                if e.is_timeout() {
                    "timeout"
                } else {
                    "connection failed"
                },
                e
            ))
        } else {
            AppError::gateway(format!("{} API request failed: {}", gateway, e))
        }
    })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::gateway(format!("Failed to read {} response: {}", gateway, e)))?;

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    Ok(ProviderResponse { status, body })
}

/// Provider URL with `segments` appended to the base path
///
/// Each segment is percent-encoded, so an id such as `../admin?x=1` stays a
/// single segment instead of changing the path or query.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    if let Some(segment) = segments
        .iter()
        .find(|s| matches!(s.trim(), "" | "." | ".."))
    {
        return Err(AppError::validation(format!(
            "Invalid path segment: {:?}",
            segment
        )));
    }

    let mut url = Url::parse(base)
        .map_err(|e| AppError::configuration(format!("Invalid provider URL {}: {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|_| AppError::configuration(format!("Provider URL cannot take a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Unique-per-millisecond donation reference, e.g. `DON-MP-1718000000000`
pub fn donation_reference(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_millis())
}

pub fn str_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Major-unit amount sent either as a JSON number or a numeric string
pub fn decimal_field(value: &Value, key: &str) -> Option<Decimal> {
    match value.get(key)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

/// Minor-unit amount (cents) converted back to major units
pub fn minor_units_field(value: &Value, key: &str) -> Option<Decimal> {
    match value.get(key)? {
        Value::Number(n) => n.as_i64().map(from_minor_units),
        Value::String(s) => s.parse::<i64>().ok().map(from_minor_units),
        _ => None,
    }
}
