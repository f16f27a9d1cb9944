pub mod gateway_controller;
pub mod payment_controller;
pub mod webhook_controller;

use actix_web::web;

/// Configure every gateway-facing route
///
/// Expects `web::Data<GatewayFactory>` and `web::Data<WebhookHandler>` to be
/// registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    gateway_controller::configure(cfg);
    payment_controller::configure(cfg);
    webhook_controller::configure(cfg);
}
