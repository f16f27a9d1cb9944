use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use super::conekta::ConektaGateway;
use super::gateway_trait::PaymentGateway;
use super::mercadopago::MercadoPagoGateway;
use super::nequi::NequiGateway;
use super::pix::PixGateway;
use super::pse::PseGateway;
use crate::config::PaymentsConfig;
use crate::core::{AppError, Result};
use crate::modules::gateways::models::{
    DonationPaymentData, GatewayInfo, GatewayKind, PaymentResult, PaymentVerification,
    SUPPORTED_GATEWAYS,
};

/// Registry of payment gateways built from validated provider configuration
///
/// Adapters for every configured provider are built once and share one
/// HTTP client.
pub struct GatewayFactory {
    gateways: HashMap<GatewayKind, Arc<dyn PaymentGateway>>,
    mercadopago: Option<Arc<MercadoPagoGateway>>,
}

impl GatewayFactory {
    /// Build adapters for every configured provider
    pub fn new(config: &PaymentsConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(config, client))
    }

    /// Build adapters sharing the given HTTP client
    pub fn with_client(config: &PaymentsConfig, client: Client) -> Self {
        let mut factory = Self::empty();

        if let Some(pse) = &config.pse {
            factory.register_gateway(Arc::new(PseGateway::new(pse.clone(), client.clone())));
        }
        if let Some(nequi) = &config.nequi {
            factory.register_gateway(Arc::new(NequiGateway::new(nequi.clone(), client.clone())));
        }
        if let Some(mp) = &config.mercadopago {
            let gateway = Arc::new(MercadoPagoGateway::new(mp.clone(), client.clone()));
            factory.mercadopago = Some(gateway.clone());
            factory.register_gateway(gateway);
        }
        if let Some(pix) = &config.pix {
            factory.register_gateway(Arc::new(PixGateway::new(pix.clone(), client.clone())));
        }
        if let Some(conekta) = &config.conekta {
            factory.register_gateway(Arc::new(ConektaGateway::spei(conekta.clone(), client.clone())));
            factory.register_gateway(Arc::new(ConektaGateway::oxxo(conekta.clone(), client.clone())));
        }

        info!(
            configured = ?factory.configured_gateways(),
            "Payment gateways registered"
        );
        factory
    }

    /// Factory with no gateways registered
    pub fn empty() -> Self {
        Self {
            gateways: HashMap::new(),
            mercadopago: None,
        }
    }

    /// Register a gateway, replacing any adapter of the same kind
    pub fn register_gateway(&mut self, gateway: Arc<dyn PaymentGateway>) {
        self.gateways.insert(gateway.kind(), gateway);
    }

    /// Look up a gateway by its string key (case-insensitive)
    ///
    /// Unknown keys are `UnsupportedGateway`; known providers without
    /// credentials are a `Configuration` error.
    pub fn create_gateway(&self, gateway_type: &str) -> Result<Arc<dyn PaymentGateway>> {
        let kind: GatewayKind = gateway_type.parse()?;
        self.gateways.get(&kind).cloned().ok_or_else(|| {
            AppError::configuration(format!("{} gateway is not configured", kind.info().name))
        })
    }

    /// MercadoPago adapter, for its country payment-method catalog
    pub fn mercadopago(&self) -> Result<Arc<MercadoPagoGateway>> {
        self.mercadopago
            .clone()
            .ok_or_else(|| AppError::configuration("MercadoPago gateway is not configured"))
    }

    /// Static listing of every gateway this service implements
    pub fn supported_gateways() -> &'static [GatewayInfo] {
        &SUPPORTED_GATEWAYS
    }

    /// Kinds with credentials, in listing order
    pub fn configured_gateways(&self) -> Vec<GatewayKind> {
        GatewayKind::ALL
            .into_iter()
            .filter(|kind| self.gateways.contains_key(kind))
            .collect()
    }

    /// Listing with a flag telling whether each gateway can take payments
    pub fn list_gateways(&self) -> Vec<GatewayListing> {
        GatewayKind::ALL
            .into_iter()
            .map(|kind| GatewayListing {
                info: kind.info(),
                configured: self.gateways.contains_key(&kind),
            })
            .collect()
    }

    /// Start a donation payment through the named gateway
    pub async fn process_payment(
        &self,
        gateway_type: &str,
        donation: &DonationPaymentData,
    ) -> Result<PaymentResult> {
        let gateway = self.create_gateway(gateway_type)?;

        info!(
            gateway = %gateway.kind(),
            church_id = %donation.church_id,
            amount = %donation.amount,
            currency = %donation.currency,
            "Processing donation payment"
        );

        let result = gateway.process_payment(donation).await;
        if result.success {
            info!(
                gateway = %gateway.kind(),
                payment_id = ?result.payment_id,
                "Donation payment initiated"
            );
        } else {
            error!(
                gateway = %gateway.kind(),
                error = ?result.error,
                "Donation payment failed"
            );
        }
        Ok(result)
    }

    /// Poll the named gateway for a payment's current status
    pub async fn verify_payment(
        &self,
        gateway_type: &str,
        payment_id: &str,
    ) -> Result<PaymentVerification> {
        let gateway = self.create_gateway(gateway_type)?;
        let verification = gateway.verify_payment(payment_id).await;

        info!(
            gateway = %gateway.kind(),
            payment_id,
            status = %verification.status,
            "Payment verified"
        );
        Ok(verification)
    }
}

impl Default for GatewayFactory {
    fn default() -> Self {
        Self::empty()
    }
}

/// Gateway information for listing
#[derive(Debug, Clone, Serialize)]
pub struct GatewayListing {
    #[serde(flatten)]
    pub info: &'static GatewayInfo,
    pub configured: bool,
}
