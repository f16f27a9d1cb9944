use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized payment status shared by all gateways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// What the donor needs to complete a display-based payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentInstructions {
    /// PIX "copia e cola" payload, rendered as a QR code
    PixQrCode {
        qr_code: String,
        location: Option<String>,
        expires_at: DateTime<Utc>,
    },
    /// SPEI interbank transfer to a CLABE account
    BankTransfer {
        clabe: Option<String>,
        bank: Option<String>,
        reference: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    },
    /// OXXO cash voucher paid at the store counter
    CashVoucher {
        reference: Option<String>,
        barcode_url: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    },
}

/// Outcome of `PaymentGateway::process_payment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,

    /// Checkout URL for redirect-based gateways
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<PaymentInstructions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Raw provider response kept for audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<Value>,
}

impl PaymentResult {
    /// Donor must be sent to `redirect_url` to finish paying
    pub fn redirect(payment_id: String, redirect_url: String, raw: Value) -> Self {
        Self {
            success: true,
            payment_id: Some(payment_id),
            redirect_url: Some(redirect_url),
            instructions: None,
            error: None,
            gateway_response: Some(raw),
        }
    }

    /// Donor pays out of band using the returned instructions
    pub fn with_instructions(
        payment_id: String,
        instructions: PaymentInstructions,
        raw: Value,
    ) -> Self {
        Self {
            success: true,
            payment_id: Some(payment_id),
            redirect_url: None,
            instructions: Some(instructions),
            error: None,
            gateway_response: Some(raw),
        }
    }

    /// Provider accepted the charge and will notify the donor itself
    pub fn accepted(payment_id: String, raw: Value) -> Self {
        Self {
            success: true,
            payment_id: Some(payment_id),
            redirect_url: None,
            instructions: None,
            error: None,
            gateway_response: Some(raw),
        }
    }

    pub fn failure(error: impl Into<String>, raw: Option<Value>) -> Self {
        Self {
            success: false,
            payment_id: None,
            redirect_url: None,
            instructions: None,
            error: Some(error.into()),
            gateway_response: raw,
        }
    }
}

/// Outcome of `PaymentGateway::verify_payment`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub status: PaymentStatus,
    pub payment_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_response: Option<Value>,
}

impl PaymentVerification {
    /// The provider could not be reached; the payment is reported as failed
    pub fn unreachable(payment_id: &str) -> Self {
        Self {
            status: PaymentStatus::Failed,
            payment_id: payment_id.to_string(),
            amount: None,
            currency: None,
            gateway_response: None,
        }
    }
}
