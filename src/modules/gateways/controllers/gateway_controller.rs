use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::core::error::AppError;
use crate::modules::gateways::services::gateway_factory::GatewayFactory;
use crate::modules::gateways::services::mercadopago::{methods_for_country, CountryPaymentMethods};

/// List all payment gateways
/// GET /gateways
/// Returns every supported gateway with a flag telling whether it is configured
pub async fn list_gateways(factory: web::Data<GatewayFactory>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(factory.list_gateways()))
}

#[derive(Debug, Serialize)]
struct CountryMethodsResponse {
    #[serde(flatten)]
    catalog: &'static CountryPaymentMethods,
    available: Vec<serde_json::Value>,
}

/// MercadoPago payment methods for one country
/// GET /gateways/mercadopago/countries/{country}/methods
pub async fn mercadopago_methods(
    factory: web::Data<GatewayFactory>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let country = path.into_inner();
    let catalog = methods_for_country(&country).ok_or_else(|| {
        AppError::validation(format!("MercadoPago does not operate in {}", country))
    })?;

    let available = factory.mercadopago()?.payment_methods(&country).await;

    Ok(HttpResponse::Ok().json(CountryMethodsResponse { catalog, available }))
}

/// Configure gateway routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/gateways")
            .route("", web::get().to(list_gateways))
            .route(
                "/mercadopago/countries/{country}/methods",
                web::get().to(mercadopago_methods),
            ),
    );
}
