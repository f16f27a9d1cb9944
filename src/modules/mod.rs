pub mod gateways;
pub mod health;

use actix_web::web;

/// Configure every HTTP route the service exposes
pub fn configure(cfg: &mut web::ServiceConfig) {
    health::configure(cfg);
    gateways::configure(cfg);
}
