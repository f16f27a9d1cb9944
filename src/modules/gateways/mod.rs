pub mod controllers;
pub mod models;
pub mod services;

pub use controllers::configure;
pub use models::{
    DonationPaymentData, GatewayInfo, GatewayKind, PaymentInstructions, PaymentResult,
    PaymentStatus, PaymentVerification,
};
pub use services::{
    ConektaGateway, GatewayFactory, MercadoPagoGateway, NequiGateway, PaymentGateway, PixGateway,
    PseGateway, WebhookHandler, WebhookOutcome,
};
