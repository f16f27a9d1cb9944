use super::gateway_trait::PaymentGateway;
use super::provider_http::{self, decimal_field, donation_reference, str_field};
use crate::config::MercadoPagoConfig;
use crate::core::{Currency, Result};
use crate::modules::gateways::models::{
    DonationPaymentData, GatewayKind, PaymentResult, PaymentStatus, PaymentVerification,
};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

// MercadoPago serves sandbox and production from the same host; the
// access token decides which one a request hits.
const API_URL: &str = "https://api.mercadopago.com/v1";

/// Payment methods MercadoPago offers in one country
#[derive(Debug, Clone, Serialize)]
pub struct CountryPaymentMethods {
    pub country: &'static str,
    pub name: &'static str,
    pub currency: Currency,
    pub methods: &'static [&'static str],
}

pub static METHODS_BY_COUNTRY: [CountryPaymentMethods; 7] = [
    CountryPaymentMethods {
        country: "AR",
        name: "Argentina",
        currency: Currency::ARS,
        methods: &["credit_card", "debit_card", "account_money", "rapipago", "pagofacil"],
    },
    CountryPaymentMethods {
        country: "BR",
        name: "Brasil",
        currency: Currency::BRL,
        methods: &["credit_card", "debit_card", "pix", "bolbradesco", "account_money"],
    },
    CountryPaymentMethods {
        country: "MX",
        name: "México",
        currency: Currency::MXN,
        methods: &["credit_card", "debit_card", "oxxo", "spei", "account_money"],
    },
    CountryPaymentMethods {
        country: "CO",
        name: "Colombia",
        currency: Currency::COP,
        methods: &["credit_card", "debit_card", "pse", "efecty", "account_money"],
    },
    CountryPaymentMethods {
        country: "CL",
        name: "Chile",
        currency: Currency::CLP,
        methods: &["credit_card", "debit_card", "khipu", "account_money"],
    },
    CountryPaymentMethods {
        country: "PE",
        name: "Perú",
        currency: Currency::PEN,
        methods: &["credit_card", "debit_card", "pagoefectivo", "account_money"],
    },
    CountryPaymentMethods {
        country: "UY",
        name: "Uruguay",
        currency: Currency::UYU,
        methods: &["credit_card", "debit_card", "abitab", "redpagos", "account_money"],
    },
];

pub fn methods_for_country(country: &str) -> Option<&'static CountryPaymentMethods> {
    METHODS_BY_COUNTRY
        .iter()
        .find(|entry| entry.country.eq_ignore_ascii_case(country.trim()))
}

/// MercadoPago Checkout Pro gateway (AR, BR, MX, CO, CL, UY, PE)
pub struct MercadoPagoGateway {
    client: Client,
    config: MercadoPagoConfig,
    base_url: String,
}

impl MercadoPagoGateway {
    pub fn new(config: MercadoPagoConfig, client: Client) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| API_URL.to_string());

        Self {
            client,
            config,
            base_url,
        }
    }

    /// Map MercadoPago payment states onto the shared status
    pub fn map_status(mp_status: &str) -> PaymentStatus {
        match mp_status.to_lowercase().as_str() {
            "approved" => PaymentStatus::Completed,
            "pending" | "in_process" | "in_mediation" => PaymentStatus::Pending,
            "rejected" => PaymentStatus::Failed,
            "cancelled" | "refunded" | "charged_back" => PaymentStatus::Cancelled,
            _ => PaymentStatus::Pending,
        }
    }

    pub(crate) fn preference_body(&self, donation: &DonationPaymentData, reference: &str) -> Value {
        let return_url = &donation.return_url;
        let phone = donation
            .donor_phone
            .as_ref()
            .map(|number| json!({ "number": number }));

        json!({
            "items": [{
                "title": donation.description(),
                "quantity": 1,
                "currency_id": Currency::from_code_or_usd(&donation.currency).code(),
                "unit_price": donation.amount.to_f64()
            }],
            "payer": {
                "name": donation.donor_name,
                "email": donation.donor_email,
                "phone": phone
            },
            "back_urls": {
                "success": format!("{}?status=success", return_url),
                "failure": format!("{}?status=failure", return_url),
                "pending": format!("{}?status=pending", return_url)
            },
            "auto_return": "approved",
            "notification_url": self.config.webhook_url,
            "external_reference": reference,
            "metadata": {
                "church_id": donation.church_id,
                "category_id": donation.category_id,
                "donor_name": donation.donor_name,
                "donor_email": donation.donor_email,
                "notes": donation.notes,
                "is_recurring": donation.is_recurring.unwrap_or(false)
            },
            "payment_methods": {
                "excluded_payment_types": [],
                "installments": 1
            }
        })
    }

    async fn create_preference(&self, donation: &DonationPaymentData) -> Result<PaymentResult> {
        donation.validate()?;

        let body = self.preference_body(donation, &donation_reference("DON-MP"));
        let response = provider_http::send(
            self.name(),
            self.client
                .post(format!("{}/checkout/preferences", self.base_url))
                .bearer_auth(&self.config.access_token)
                .json(&body),
        )
        .await?;

        let init_point_key = if self.config.environment.is_sandbox() {
            "sandbox_init_point"
        } else {
            "init_point"
        };

        match (
            response.is_success(),
            str_field(&response.body, "id"),
            str_field(&response.body, init_point_key),
        ) {
            (true, Some(preference_id), Some(redirect_url)) => {
                info!(
                    gateway = "mercadopago",
                    payment_id = %preference_id,
                    church_id = %donation.church_id,
                    "MercadoPago preference created"
                );
                Ok(PaymentResult::redirect(preference_id, redirect_url, response.body))
            }
            _ => {
                warn!(gateway = "mercadopago", status = %response.status, "MercadoPago rejected preference");
                Ok(response.rejection("MercadoPago payment could not be processed"))
            }
        }
    }

    /// Provider payment methods available in `country`
    ///
    /// Unknown countries and provider failures both yield an empty list.
    pub async fn payment_methods(&self, country: &str) -> Vec<Value> {
        let Some(catalog) = methods_for_country(country) else {
            return Vec::new();
        };

        let request = self
            .client
            .get(format!("{}/payment_methods", self.base_url))
            .query(&[("marketplace", "NONE")])
            .bearer_auth(&self.config.access_token);

        match provider_http::send(self.name(), request).await {
            Ok(response) if response.is_success() => match response.body {
                Value::Array(methods) => methods
                    .into_iter()
                    .filter(|method| {
                        method
                            .get("id")
                            .and_then(Value::as_str)
                            .is_some_and(|id| catalog.methods.contains(&id))
                    })
                    .collect(),
                _ => Vec::new(),
            },
            Ok(response) => {
                warn!(gateway = "mercadopago", status = %response.status, "MercadoPago payment methods rejected");
                Vec::new()
            }
            Err(e) => {
                error!(gateway = "mercadopago", error = %e, "MercadoPago payment methods error");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    fn kind(&self) -> GatewayKind {
        GatewayKind::MercadoPago
    }

    fn name(&self) -> &str {
        "MercadoPago"
    }

    async fn process_payment(&self, donation: &DonationPaymentData) -> PaymentResult {
        match self.create_preference(donation).await {
            Ok(result) => result,
            Err(crate::core::AppError::Validation(msg)) => PaymentResult::failure(msg, None),
            Err(e) => {
                error!(gateway = "mercadopago", error = %e, "MercadoPago payment error");
                PaymentResult::failure("Could not connect to MercadoPago", None)
            }
        }
    }

    async fn verify_payment(&self, payment_id: &str) -> PaymentVerification {
        let lookup = async {
            let url = provider_http::endpoint(&self.base_url, &["payments", payment_id])?;
            provider_http::send(self.name(), self.client.get(url).bearer_auth(&self.config.access_token)).await
        };

        match lookup.await {
            Ok(response) => {
                if !response.is_success() {
                    warn!(gateway = "mercadopago", payment_id, status = %response.status, "MercadoPago status lookup rejected");
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
                    amount: decimal_field(&response.body, "transaction_amount"),
                    currency: str_field(&response.body, "currency_id"),
                    gateway_response: Some(response.body),
                }
            }
            Err(e) => {
                error!(gateway = "mercadopago", payment_id, error = %e, "MercadoPago verify error");
                PaymentVerification::unreachable(payment_id)
            }
        }
    }
}
