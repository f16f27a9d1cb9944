use actix_web::{http::header, web, HttpRequest, HttpResponse};
use serde_json::Value;

use crate::core::Result;
use crate::modules::gateways::services::webhook_handler::WebhookHandler;

/// Provider callback for any gateway
///
/// POST /webhooks/payments
///
/// The sending gateway is identified from the User-Agent or the body, the
/// payment is re-verified with that gateway and the normalized status is
/// returned.
///
/// # Returns
/// * `200 OK` - Payment re-verified
/// * `400 Bad Request` - Gateway or payment id could not be determined
/// * `500 Internal Server Error` - Gateway named by the callback is not configured
pub async fn process_webhook(
    req: HttpRequest,
    payload: web::Json<Value>,
    handler: web::Data<WebhookHandler>,
) -> Result<HttpResponse> {
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());

    let outcome = handler.process_webhook(user_agent, &payload).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Configure webhook routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/webhooks").route("/payments", web::post().to(process_webhook)));
}
