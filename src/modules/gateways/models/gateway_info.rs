use crate::core::AppError;
use serde::{Deserialize, Serialize};

/// Every payment gateway this service can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    MercadoPago,
    Pse,
    Nequi,
    Pix,
    Spei,
    Oxxo,
}

impl GatewayKind {
    pub const ALL: [GatewayKind; 6] = [
        GatewayKind::MercadoPago,
        GatewayKind::Pse,
        GatewayKind::Nequi,
        GatewayKind::Pix,
        GatewayKind::Spei,
        GatewayKind::Oxxo,
    ];

    /// Key used in URLs, webhooks and the gateway listing
    pub fn id(&self) -> &'static str {
        self.info().id
    }

    pub fn info(&self) -> &'static GatewayInfo {
        let index = match self {
            GatewayKind::MercadoPago => 0,
            GatewayKind::Pse => 1,
            GatewayKind::Nequi => 2,
            GatewayKind::Pix => 3,
            GatewayKind::Spei => 4,
            GatewayKind::Oxxo => 5,
        };
        &SUPPORTED_GATEWAYS[index]
    }
}

impl std::fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for GatewayKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        GatewayKind::ALL
            .into_iter()
            .find(|kind| kind.id() == key)
            .ok_or_else(|| AppError::UnsupportedGateway(s.to_string()))
    }
}

/// Presentation metadata for a gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub country: &'static str,
}

/// Hand-maintained listing rendered by the donation form
pub static SUPPORTED_GATEWAYS: [GatewayInfo; 6] = [
    GatewayInfo {
        id: "mercadopago",
        name: "MercadoPago",
        description: "Pagos en toda América Latina",
        country: "LATAM",
    },
    GatewayInfo {
        id: "pse",
        name: "PSE - Pagos Seguros en Línea",
        description: "Pago con cualquier banco colombiano",
        country: "CO",
    },
    GatewayInfo {
        id: "nequi",
        name: "Nequi",
        description: "Pago desde tu cuenta Nequi",
        country: "CO",
    },
    GatewayInfo {
        id: "pix",
        name: "PIX",
        description: "Pagamento instantâneo 24/7",
        country: "BR",
    },
    GatewayInfo {
        id: "spei",
        name: "SPEI",
        description: "Transferencia bancaria interbancaria",
        country: "MX",
    },
    GatewayInfo {
        id: "oxxo",
        name: "OXXO",
        description: "Pago en efectivo en tiendas OXXO",
        country: "MX",
    },
];
