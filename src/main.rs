use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ofrenda::config::{Config, ServerConfig};
use ofrenda::gateways::{GatewayFactory, WebhookHandler};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("ofrenda={},actix_web=info", config.app.log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.app.env == "production" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!("Starting Ofrenda donation payment service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let factory = Arc::new(
        GatewayFactory::new(&config.payments).context("Failed to initialize payment gateways")?,
    );
    let webhook_handler = WebhookHandler::new(factory.clone());

    let server_config = config.server.clone();
    let bind_address = server_config.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&server_config))
            .wrap(TracingLogger::default())
            .app_data(web::Data::from(factory.clone()))
            .app_data(web::Data::new(webhook_handler.clone()))
            .configure(ofrenda::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}

fn cors(config: &ServerConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    config
        .cors_allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
