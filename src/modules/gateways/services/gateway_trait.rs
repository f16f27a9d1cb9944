use crate::modules::gateways::models::{
    DonationPaymentData, GatewayKind, PaymentResult, PaymentVerification,
};
use async_trait::async_trait;

/// Payment gateway trait implemented by every provider adapter
///
/// Neither operation returns an error: transport failures and provider
/// rejections are folded into the returned value and logged.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registry key of this gateway
    fn kind(&self) -> GatewayKind;

    /// Short provider name used in logs and error messages
    fn name(&self) -> &str;

    /// Start a donation charge, or produce a payable reference (QR, CLABE, voucher)
    async fn process_payment(&self, donation: &DonationPaymentData) -> PaymentResult;

    /// Poll the provider for the current status of a payment
    async fn verify_payment(&self, payment_id: &str) -> PaymentVerification;
}
