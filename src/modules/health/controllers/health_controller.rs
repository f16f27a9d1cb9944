use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::modules::gateways::models::GatewayKind;
use crate::modules::gateways::services::gateway_factory::GatewayFactory;

/// Health check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

/// Readiness check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub configured_gateways: Vec<GatewayKind>,
}

/// GET /health - Liveness check
/// Returns 200 if the application is alive (can respond to requests)
pub async fn health_check() -> impl Responder {
    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: env!("CARGO_PKG_NAME").to_string(),
    };

    HttpResponse::Ok().json(response)
}

/// GET /ready - Readiness check
/// Ready once at least one gateway has credentials
pub async fn readiness_check(factory: web::Data<GatewayFactory>) -> impl Responder {
    let configured_gateways = factory.configured_gateways();
    let ready = !configured_gateways.is_empty();

    if !ready {
        tracing::warn!("Readiness check failed: no payment gateway is configured");
    }

    let response = ReadinessResponse {
        ready,
        configured_gateways,
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/ready", web::get().to(readiness_check));
}
