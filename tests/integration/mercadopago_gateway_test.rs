// MercadoPago adapter against a stub Checkout Pro API

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{web, HttpRequest, HttpResponse};
use helpers::*;
use ofrenda::config::{GatewayEnvironment, MercadoPagoConfig};
use ofrenda::gateways::{MercadoPagoGateway, PaymentGateway, PaymentStatus};
use reqwest::Client;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

const ACCESS_TOKEN: &str = "TEST-mp-token";

fn mercadopago_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/checkout/preferences", web::post().to(create_preference))
        .route("/payment_methods", web::get().to(payment_methods))
        .route("/payments/{payment_id}", web::get().to(payment_status));
}

async fn create_preference(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if bearer_token(&req).as_deref() != Some(ACCESS_TOKEN) {
        return HttpResponse::Unauthorized()
            .json(json!({"message": "invalid access token", "status": 401}));
    }
    if body["metadata"]["church_id"] == "church-without-checkout" {
        return HttpResponse::Created().json(json!({"id": "123456-pref"}));
    }

    HttpResponse::Created().json(json!({
        "id": "123456-pref",
        "init_point": "https://www.mercadopago.com/checkout/v1/redirect?pref_id=123456-pref",
        "sandbox_init_point": "https://sandbox.mercadopago.com/checkout/v1/redirect?pref_id=123456-pref",
        "received": body.into_inner()
    }))
}

async fn payment_methods(query: web::Query<std::collections::HashMap<String, String>>) -> HttpResponse {
    if query.get("marketplace").map(String::as_str) != Some("NONE") {
        return HttpResponse::BadRequest().finish();
    }

    HttpResponse::Ok().json(json!([
        {"id": "pse", "name": "PSE", "payment_type_id": "bank_transfer"},
        {"id": "efecty", "name": "Efecty", "payment_type_id": "ticket"},
        {"id": "pix", "name": "PIX", "payment_type_id": "bank_transfer"},
        {"id": "oxxo", "name": "OXXO", "payment_type_id": "ticket"}
    ]))
}

async fn payment_status(path: web::Path<String>) -> HttpResponse {
    let payment_id = path.into_inner();
    let status = match payment_id.as_str() {
        "1001" => "approved",
        "1002" => "in_process",
        "1003" => "rejected",
        "1004" => "refunded",
        _ => "authorized",
    };

    HttpResponse::Ok().json(json!({
        "id": payment_id.parse::<i64>().unwrap_or_default(),
        "status": status,
        "transaction_amount": 150.75,
        "currency_id": "ARS"
    }))
}

fn gateway(base_url: String, environment: GatewayEnvironment) -> MercadoPagoGateway {
    MercadoPagoGateway::new(
        MercadoPagoConfig {
            access_token: ACCESS_TOKEN.to_string(),
            environment,
            webhook_url: Some("https://iglesia.example/webhooks/payments".to_string()),
            base_url: Some(base_url),
        },
        Client::new(),
    )
}

#[actix_web::test]
async fn test_sandbox_preference_uses_sandbox_checkout() {
    let srv = start_provider(mercadopago_routes);
    let mp = gateway(api_url(&srv), GatewayEnvironment::Sandbox);

    let result = mp.process_payment(&donation("ARS")).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.payment_id.as_deref(), Some("123456-pref"));
    assert!(result
        .redirect_url
        .as_deref()
        .unwrap()
        .starts_with("https://sandbox.mercadopago.com/"));

    let sent = &result.gateway_response.expect("raw response kept")["received"];
    assert_eq!(sent["items"][0]["unit_price"].as_f64(), Some(10.5));
    assert_eq!(sent["items"][0]["currency_id"], "ARS");
    assert_eq!(sent["items"][0]["quantity"], 1);
    assert_eq!(sent["payer"]["email"], "maria@example.com");
    assert_eq!(
        sent["back_urls"]["pending"],
        "https://iglesia.example/donaciones/gracias?status=pending"
    );
    assert_eq!(sent["metadata"]["is_recurring"], false);
}

#[actix_web::test]
async fn test_production_preference_uses_init_point() {
    let srv = start_provider(mercadopago_routes);
    let mp = gateway(api_url(&srv), GatewayEnvironment::Production);

    let result = mp.process_payment(&donation("COP")).await;

    assert!(result.success);
    assert!(result
        .redirect_url
        .as_deref()
        .unwrap()
        .starts_with("https://www.mercadopago.com/"));
}

#[actix_web::test]
async fn test_unsupported_currency_falls_back_to_usd() {
    let srv = start_provider(mercadopago_routes);
    let mp = gateway(api_url(&srv), GatewayEnvironment::Sandbox);

    let result = mp.process_payment(&donation("EUR")).await;

    let sent = &result.gateway_response.expect("raw response kept")["received"];
    assert_eq!(sent["items"][0]["currency_id"], "USD");
}

#[actix_web::test]
async fn test_rejection_carries_provider_message() {
    let srv = start_provider(mercadopago_routes);
    let mp = MercadoPagoGateway::new(
        MercadoPagoConfig {
            access_token: "expired".to_string(),
            environment: GatewayEnvironment::Sandbox,
            webhook_url: None,
            base_url: Some(api_url(&srv)),
        },
        Client::new(),
    );

    let result = mp.process_payment(&donation("ARS")).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("invalid access token"));
    assert_eq!(result.gateway_response.unwrap()["status"], 401);
}

#[actix_web::test]
async fn test_preference_without_checkout_url_is_failure() {
    let srv = start_provider(mercadopago_routes);
    let mp = gateway(api_url(&srv), GatewayEnvironment::Sandbox);

    let mut data = donation("ARS");
    data.church_id = "church-without-checkout".to_string();
    let result = mp.process_payment(&data).await;

    assert!(!result.success);
    assert!(result.redirect_url.is_none());
    assert_eq!(
        result.error.as_deref(),
        Some("MercadoPago payment could not be processed")
    );
    assert_eq!(result.gateway_response.unwrap()["id"], "123456-pref");
}

#[actix_web::test]
async fn test_unreachable_provider() {
    let mp = gateway(UNREACHABLE_URL.to_string(), GatewayEnvironment::Sandbox);

    let result = mp.process_payment(&donation("ARS")).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Could not connect to MercadoPago"));

    assert_eq!(mp.verify_payment("1001").await.status, PaymentStatus::Failed);
    assert!(mp.payment_methods("CO").await.is_empty());
}

#[actix_web::test]
async fn test_verify_payment() {
    let srv = start_provider(mercadopago_routes);
    let mp = gateway(api_url(&srv), GatewayEnvironment::Sandbox);

    let approved = mp.verify_payment("1001").await;
    assert_eq!(approved.status, PaymentStatus::Completed);
    assert_eq!(approved.amount, Some(dec!(150.75)));
    assert_eq!(approved.currency.as_deref(), Some("ARS"));

    let cases = [
        ("1002", PaymentStatus::Pending),
        ("1003", PaymentStatus::Failed),
        ("1004", PaymentStatus::Cancelled),
        ("1005", PaymentStatus::Pending),
    ];
    for (payment_id, expected) in cases {
        assert_eq!(mp.verify_payment(payment_id).await.status, expected, "{}", payment_id);
    }
}

#[actix_web::test]
async fn test_payment_methods_filtered_by_country() {
    let srv = start_provider(mercadopago_routes);
    let mp = gateway(api_url(&srv), GatewayEnvironment::Sandbox);

    let colombia: Vec<Value> = mp.payment_methods("co").await;
    let ids: Vec<&str> = colombia.iter().filter_map(|m| m["id"].as_str()).collect();
    assert_eq!(ids, vec!["pse", "efecty"]);

    let mexico = mp.payment_methods("MX").await;
    assert_eq!(mexico.len(), 1);
    assert_eq!(mexico[0]["id"], "oxxo");

    assert!(mp.payment_methods("US").await.is_empty());
}
