pub mod donation;
pub mod gateway_info;
pub mod payment;

pub use donation::DonationPaymentData;
pub use gateway_info::{GatewayInfo, GatewayKind, SUPPORTED_GATEWAYS};
pub use payment::{PaymentInstructions, PaymentResult, PaymentStatus, PaymentVerification};
