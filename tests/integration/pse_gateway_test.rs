// PSE adapter against a stub PSE API
//
// Covers the redirect flow, provider rejections, transport failures and
// status lookups with amount conversion from cents.

#[path = "../helpers/mod.rs"]
mod helpers;

use actix_web::{web, HttpRequest, HttpResponse};
use helpers::*;
use ofrenda::config::{GatewayEnvironment, PseConfig};
use ofrenda::gateways::{PaymentGateway, PaymentStatus, PseGateway};
use reqwest::Client;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

const API_KEY: &str = "pse-key";

fn pse_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/payments", web::post().to(create_payment))
        .route("/payments/{payment_id}", web::get().to(payment_status));
}

async fn create_payment(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if bearer_token(&req).as_deref() != Some(API_KEY) {
        return HttpResponse::Unauthorized().json(json!({"message": "Invalid API key"}));
    }
    if body["metadata"]["church_id"] == "church-without-bank" {
        return HttpResponse::Ok().json(json!({"status": "error"}));
    }

    HttpResponse::Created().json(json!({
        "payment_id": "PSE-98765",
        "payment_url": "https://checkout.pse.example/PSE-98765",
        "status": "pending",
        "received": body.into_inner()
    }))
}

async fn payment_status(req: HttpRequest, path: web::Path<String>) -> HttpResponse {
    let payment_id = path.into_inner();
    let status = match payment_id.as_str() {
        "PSE-approved" => "APPROVED",
        "PSE-declined" => "declined",
        "PSE-cancelled" => "cancelled",
        "PSE-on-hold" => "on_hold",
        _ => "pending",
    };

    HttpResponse::Ok().json(json!({
        "payment_id": payment_id,
        "status": status,
        "amount": 1050,
        "currency": "COP",
        "requested_path": req.path(),
        "query": req.query_string()
    }))
}

fn gateway(base_url: String, api_key: &str) -> PseGateway {
    PseGateway::new(
        PseConfig {
            merchant_id: "merchant-1".to_string(),
            api_key: api_key.to_string(),
            environment: GatewayEnvironment::Sandbox,
            webhook_url: Some("https://iglesia.example/webhooks/payments".to_string()),
            base_url: Some(base_url),
        },
        Client::new(),
    )
}

#[actix_web::test]
async fn test_payment_returns_redirect() {
    let srv = start_provider(pse_routes);
    let pse = gateway(api_url(&srv), API_KEY);

    let result = pse.process_payment(&donation("COP")).await;

    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.payment_id.as_deref(), Some("PSE-98765"));
    assert_eq!(
        result.redirect_url.as_deref(),
        Some("https://checkout.pse.example/PSE-98765")
    );
    assert!(result.error.is_none());

    let sent = &result.gateway_response.expect("raw response kept")["received"];
    assert_eq!(sent["amount"], 1050);
    assert_eq!(sent["currency"], "COP");
    assert_eq!(sent["merchant_id"], "merchant-1");
    assert_eq!(sent["description"], "Donación - church-42");
    assert!(sent["reference"].as_str().unwrap().starts_with("DON-"));
}

#[actix_web::test]
async fn test_rejection_carries_provider_message() {
    let srv = start_provider(pse_routes);
    let pse = gateway(api_url(&srv), "wrong-key");

    let result = pse.process_payment(&donation("COP")).await;

    assert!(!result.success);
    assert!(result.payment_id.is_none());
    assert_eq!(result.error.as_deref(), Some("Invalid API key"));
    assert!(result.gateway_response.is_some());
}

#[actix_web::test]
async fn test_missing_payment_url_is_failure() {
    let srv = start_provider(pse_routes);
    let pse = gateway(api_url(&srv), API_KEY);

    let mut data = donation("COP");
    data.church_id = "church-without-bank".to_string();
    let result = pse.process_payment(&data).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("PSE payment could not be processed")
    );
}

#[actix_web::test]
async fn test_unreachable_provider() {
    let pse = gateway(UNREACHABLE_URL.to_string(), API_KEY);

    let result = pse.process_payment(&donation("COP")).await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Could not connect to PSE"));

    let verification = pse.verify_payment("PSE-98765").await;
    assert_eq!(verification.status, PaymentStatus::Failed);
    assert_eq!(verification.payment_id, "PSE-98765");
}

#[actix_web::test]
async fn test_invalid_donation_never_reaches_provider() {
    let pse = gateway(UNREACHABLE_URL.to_string(), API_KEY);

    let mut data = donation("COP");
    data.amount = dec!(0);
    let result = pse.process_payment(&data).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Donation amount must be greater than 0")
    );
}

#[actix_web::test]
async fn test_verify_maps_status_and_amount() {
    let srv = start_provider(pse_routes);
    let pse = gateway(api_url(&srv), API_KEY);

    let approved = pse.verify_payment("PSE-approved").await;
    assert_eq!(approved.status, PaymentStatus::Completed);
    assert_eq!(approved.amount, Some(dec!(10.50)));
    assert_eq!(approved.currency.as_deref(), Some("COP"));
    assert!(approved.gateway_response.is_some());

    let cases = [
        ("PSE-declined", PaymentStatus::Failed),
        ("PSE-cancelled", PaymentStatus::Cancelled),
        ("PSE-on-hold", PaymentStatus::Pending),
        ("PSE-1", PaymentStatus::Pending),
    ];
    for (payment_id, expected) in cases {
        assert_eq!(pse.verify_payment(payment_id).await.status, expected, "{}", payment_id);
    }
}

#[actix_web::test]
async fn test_verify_keeps_payment_id_in_one_path_segment() {
    let srv = start_provider(pse_routes);
    let pse = gateway(api_url(&srv), API_KEY);

    let verification = pse.verify_payment("../admin/refunds?all=true").await;

    let raw = verification.gateway_response.expect("provider reached");
    let requested = raw["requested_path"].as_str().unwrap();
    assert!(requested.starts_with("/api/payments/"), "{}", requested);
    assert!(!requested.contains("/admin/"), "{}", requested);
    assert_eq!(requested.matches('/').count(), 3, "{}", requested);
    assert_eq!(raw["query"], "");
    assert_eq!(verification.payment_id, "../admin/refunds?all=true");
}

#[actix_web::test]
async fn test_verify_rejects_dot_segment_id() {
    let srv = start_provider(pse_routes);
    let pse = gateway(api_url(&srv), API_KEY);

    let verification = pse.verify_payment("..").await;
    assert_eq!(verification.status, PaymentStatus::Failed);
    assert!(verification.gateway_response.is_none());
}
