pub mod conekta;
pub mod gateway_factory;
pub mod gateway_trait;
pub mod mercadopago;
pub mod nequi;
pub mod pix;
pub mod provider_http;
pub mod pse;
pub mod webhook_handler;

pub use conekta::{ConektaGateway, ConektaMethod};
pub use gateway_factory::{GatewayFactory, GatewayListing};
pub use gateway_trait::PaymentGateway;
pub use mercadopago::{methods_for_country, CountryPaymentMethods, MercadoPagoGateway};
pub use nequi::NequiGateway;
pub use pix::PixGateway;
pub use pse::PseGateway;
pub use webhook_handler::{WebhookHandler, WebhookOutcome};
