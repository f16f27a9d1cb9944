//! Ofrenda donation payment gateway library
//!
//! One interface over the LATAM providers churches use to receive
//! donations: PSE, Nequi, MercadoPago, PIX, SPEI and OXXO.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::configure;
pub use modules::gateways;
