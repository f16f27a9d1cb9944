// Contract tests for POST /webhooks/payments
//
// Callbacks are re-verified against (stub) provider APIs before the
// normalized status is returned.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use actix_web::{test, web, App, HttpResponse};
use helpers::*;
use ofrenda::gateways::{GatewayFactory, WebhookHandler};
use serde_json::{json, Value};

fn provider_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/payments/{payment_id}", web::get().to(payment_status))
        .route("/oauth/token", web::post().to(nequi_token));
}

/// Shared status endpoint: PSE, Nequi and MercadoPago all use `/payments/{id}`
async fn payment_status(path: web::Path<String>) -> HttpResponse {
    let payment_id = path.into_inner();
    let status = match payment_id.as_str() {
        "PSE-3001" => "approved",
        "NEQ-3002" => "declined",
        "987654321" => "refunded",
        _ => "pending",
    };
    HttpResponse::Ok().json(json!({"status": status}))
}

async fn nequi_token() -> HttpResponse {
    HttpResponse::Ok().json(json!({"access_token": "nequi-token"}))
}

fn factory(provider_url: &str) -> Arc<GatewayFactory> {
    let config = payments_config(&[
        ("PSE_API_KEY", "pse-key"),
        ("PSE_MERCHANT_ID", "merchant-1"),
        ("PSE_API_URL", provider_url),
        ("NEQUI_CLIENT_ID", "client"),
        ("NEQUI_CLIENT_SECRET", "secret"),
        ("NEQUI_API_URL", provider_url),
        ("MERCADOPAGO_ACCESS_TOKEN", "TEST-token"),
        ("MERCADOPAGO_API_URL", provider_url),
    ]);
    Arc::new(GatewayFactory::new(&config).unwrap())
}

macro_rules! init_app {
    ($factory:expr) => {{
        let factory = $factory;
        test::init_service(
            App::new()
                .app_data(web::Data::from(factory.clone()))
                .app_data(web::Data::new(WebhookHandler::new(factory)))
                .configure(ofrenda::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_pse_webhook_identified_by_user_agent() {
    let srv = start_provider(provider_routes);
    let app = init_app!(factory(&api_url(&srv)));

    let req = test::TestRequest::post()
        .uri("/webhooks/payments")
        .insert_header(("User-Agent", "PSE-Notifications/1.0"))
        .set_json(json!({"payment_id": "PSE-3001", "status": "APPROVED"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Webhook processed successfully");
    assert_eq!(body["gateway"], "pse");
    assert_eq!(body["payment_id"], "PSE-3001");
    assert_eq!(body["status"], "completed");
}

#[actix_web::test]
async fn test_nequi_webhook_uses_transaction_id() {
    let srv = start_provider(provider_routes);
    let app = init_app!(factory(&api_url(&srv)));

    let req = test::TestRequest::post()
        .uri("/webhooks/payments")
        .insert_header(("User-Agent", "Nequi-Webhook"))
        .set_json(json!({"transaction_id": "NEQ-3002"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["gateway"], "nequi");
    assert_eq!(body["status"], "failed");
}

#[actix_web::test]
async fn test_mercadopago_notification_from_body() {
    let srv = start_provider(provider_routes);
    let app = init_app!(factory(&api_url(&srv)));

    let req = test::TestRequest::post()
        .uri("/webhooks/payments")
        .set_json(json!({
            "gateway": "mercadopago",
            "type": "payment",
            "data": {"id": 987654321}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["gateway"], "mercadopago");
    assert_eq!(body["payment_id"], "987654321");
    assert_eq!(body["status"], "cancelled");
}

#[actix_web::test]
async fn test_unknown_sender_is_bad_request() {
    let app = init_app!(factory(UNREACHABLE_URL));

    let req = test::TestRequest::post()
        .uri("/webhooks/payments")
        .insert_header(("User-Agent", "curl/8.4.0"))
        .set_json(json!({"payment_id": "X-1"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Cannot determine gateway type"));
}

#[actix_web::test]
async fn test_missing_payment_id_is_bad_request() {
    let app = init_app!(factory(UNREACHABLE_URL));

    let req = test::TestRequest::post()
        .uri("/webhooks/payments")
        .insert_header(("User-Agent", "PSE-Notifications/1.0"))
        .set_json(json!({"status": "APPROVED"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Payment ID not found in webhook"));
}

#[actix_web::test]
async fn test_unconfigured_gateway_is_server_error() {
    let app = init_app!(factory(UNREACHABLE_URL));

    let req = test::TestRequest::post()
        .uri("/webhooks/payments")
        .set_json(json!({"source": "pix", "txid": "abc", "id": "abc"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);
}

#[actix_web::test]
async fn test_unreachable_provider_reports_failed() {
    let app = init_app!(factory(UNREACHABLE_URL));

    let req = test::TestRequest::post()
        .uri("/webhooks/payments")
        .insert_header(("User-Agent", "PSE-Notifications/1.0"))
        .set_json(json!({"payment_id": "PSE-3001"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "failed");
}
