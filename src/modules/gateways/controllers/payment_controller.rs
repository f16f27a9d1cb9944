use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::gateways::models::DonationPaymentData;
use crate::modules::gateways::services::gateway_factory::GatewayFactory;

/// Start a donation payment
/// POST /payments/{gateway}
///
/// 201 with the `PaymentResult` when the provider accepted the payment,
/// 402 with the failed `PaymentResult` when it did not.
pub async fn create_payment(
    factory: web::Data<GatewayFactory>,
    path: web::Path<String>,
    donation: web::Json<DonationPaymentData>,
) -> Result<HttpResponse, AppError> {
    let gateway = path.into_inner();
    let result = factory.process_payment(&gateway, &donation).await?;

    if result.success {
        Ok(HttpResponse::Created().json(result))
    } else {
        Ok(HttpResponse::PaymentRequired().json(result))
    }
}

/// Current status of a payment
/// GET /payments/{gateway}/{payment_id}
pub async fn verify_payment(
    factory: web::Data<GatewayFactory>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (gateway, payment_id) = path.into_inner();
    let verification = factory.verify_payment(&gateway, &payment_id).await?;
    Ok(HttpResponse::Ok().json(verification))
}

/// Configure payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/{gateway}", web::post().to(create_payment))
            .route("/{gateway}/{payment_id}", web::get().to(verify_payment)),
    );
}
