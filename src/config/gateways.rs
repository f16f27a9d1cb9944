use crate::core::{AppError, Result};

/// Provider environment, selected from the `*_TEST_MODE` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEnvironment {
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    pub fn from_test_mode(test_mode: bool) -> Self {
        if test_mode {
            GatewayEnvironment::Sandbox
        } else {
            GatewayEnvironment::Production
        }
    }

    pub fn is_sandbox(&self) -> bool {
        matches!(self, GatewayEnvironment::Sandbox)
    }

    /// Picks the provider URL matching this environment
    pub fn select<'a>(&self, sandbox: &'a str, production: &'a str) -> &'a str {
        match self {
            GatewayEnvironment::Sandbox => sandbox,
            GatewayEnvironment::Production => production,
        }
    }
}

impl std::fmt::Display for GatewayEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayEnvironment::Sandbox => write!(f, "sandbox"),
            GatewayEnvironment::Production => write!(f, "production"),
        }
    }
}

/// PSE (Pagos Seguros en Línea) credentials
#[derive(Debug, Clone)]
pub struct PseConfig {
    pub merchant_id: String,
    pub api_key: String,
    pub environment: GatewayEnvironment,
    pub webhook_url: Option<String>,
    pub base_url: Option<String>,
}

/// Nequi OAuth client credentials
#[derive(Debug, Clone)]
pub struct NequiConfig {
    pub client_id: String,
    pub client_secret: String,
    pub environment: GatewayEnvironment,
    pub webhook_url: Option<String>,
    pub base_url: Option<String>,
}

/// MercadoPago checkout credentials
#[derive(Debug, Clone)]
pub struct MercadoPagoConfig {
    pub access_token: String,
    pub environment: GatewayEnvironment,
    pub webhook_url: Option<String>,
    pub base_url: Option<String>,
}

/// PIX receiver key and PSP credentials
#[derive(Debug, Clone)]
pub struct PixConfig {
    pub pix_key: String,
    pub api_key: String,
    pub environment: GatewayEnvironment,
    pub base_url: Option<String>,
}

/// Conekta credentials, shared by SPEI and OXXO
#[derive(Debug, Clone)]
pub struct ConektaConfig {
    pub api_key: String,
    pub environment: GatewayEnvironment,
    pub base_url: Option<String>,
}

/// Credentials for every payment provider
///
/// A provider section is `None` when none of its credentials are set.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    pub pse: Option<PseConfig>,
    pub nequi: Option<NequiConfig>,
    pub mercadopago: Option<MercadoPagoConfig>,
    pub pix: Option<PixConfig>,
    pub conekta: Option<ConektaConfig>,
    pub http_timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            pse: None,
            nequi: None,
            mercadopago: None,
            pix: None,
            conekta: None,
            http_timeout_secs: 30,
        }
    }
}

impl PaymentsConfig {
    /// Build provider configuration from a variable lookup (usually the process environment)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pse = if any_set(&lookup, &["PSE_API_KEY", "PSE_MERCHANT_ID"]) {
            Some(PseConfig {
                merchant_id: required(&lookup, "PSE_MERCHANT_ID")?,
                api_key: required(&lookup, "PSE_API_KEY")?,
                environment: test_mode(&lookup, "PSE_TEST_MODE"),
                webhook_url: lookup("PSE_WEBHOOK_URL"),
                base_url: lookup("PSE_API_URL"),
            })
        } else {
            None
        };

        let nequi = if any_set(&lookup, &["NEQUI_CLIENT_ID", "NEQUI_CLIENT_SECRET"]) {
            Some(NequiConfig {
                client_id: required(&lookup, "NEQUI_CLIENT_ID")?,
                client_secret: required(&lookup, "NEQUI_CLIENT_SECRET")?,
                environment: test_mode(&lookup, "NEQUI_TEST_MODE"),
                webhook_url: lookup("NEQUI_WEBHOOK_URL"),
                base_url: lookup("NEQUI_API_URL"),
            })
        } else {
            None
        };

        let mercadopago = lookup("MERCADOPAGO_ACCESS_TOKEN").map(|access_token| MercadoPagoConfig {
            access_token,
            environment: test_mode(&lookup, "MERCADOPAGO_TEST_MODE"),
            webhook_url: lookup("MERCADOPAGO_WEBHOOK_URL"),
            base_url: lookup("MERCADOPAGO_API_URL"),
        });

        let pix = if any_set(&lookup, &["PIX_API_KEY", "PIX_KEY"]) {
            Some(PixConfig {
                pix_key: required(&lookup, "PIX_KEY")?,
                api_key: required(&lookup, "PIX_API_KEY")?,
                environment: test_mode(&lookup, "PIX_TEST_MODE"),
                base_url: lookup("PIX_API_URL"),
            })
        } else {
            None
        };

        let conekta = lookup("CONEKTA_API_KEY").map(|api_key| ConektaConfig {
            api_key,
            environment: test_mode(&lookup, "CONEKTA_TEST_MODE"),
            base_url: lookup("CONEKTA_API_URL"),
        });

        let http_timeout_secs = lookup("GATEWAY_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map_err(|_| AppError::configuration("Invalid GATEWAY_HTTP_TIMEOUT_SECS"))?;

        Ok(Self {
            pse,
            nequi,
            mercadopago,
            pix,
            conekta,
            http_timeout_secs,
        })
    }

    /// Validate every configured provider so a bad deployment fails at startup
    pub fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            return Err(AppError::configuration(
                "GATEWAY_HTTP_TIMEOUT_SECS must be greater than 0",
            ));
        }

        if let Some(pse) = &self.pse {
            not_empty("PSE_MERCHANT_ID", &pse.merchant_id)?;
            not_empty("PSE_API_KEY", &pse.api_key)?;
            valid_url("PSE_WEBHOOK_URL", pse.webhook_url.as_deref())?;
            valid_url("PSE_API_URL", pse.base_url.as_deref())?;
        }

        if let Some(nequi) = &self.nequi {
            not_empty("NEQUI_CLIENT_ID", &nequi.client_id)?;
            not_empty("NEQUI_CLIENT_SECRET", &nequi.client_secret)?;
            valid_url("NEQUI_WEBHOOK_URL", nequi.webhook_url.as_deref())?;
            valid_url("NEQUI_API_URL", nequi.base_url.as_deref())?;
        }

        if let Some(mp) = &self.mercadopago {
            not_empty("MERCADOPAGO_ACCESS_TOKEN", &mp.access_token)?;
            valid_url("MERCADOPAGO_WEBHOOK_URL", mp.webhook_url.as_deref())?;
            valid_url("MERCADOPAGO_API_URL", mp.base_url.as_deref())?;
        }

        if let Some(pix) = &self.pix {
            not_empty("PIX_KEY", &pix.pix_key)?;
            not_empty("PIX_API_KEY", &pix.api_key)?;
            valid_url("PIX_API_URL", pix.base_url.as_deref())?;
        }

        if let Some(conekta) = &self.conekta {
            not_empty("CONEKTA_API_KEY", &conekta.api_key)?;
            valid_url("CONEKTA_API_URL", conekta.base_url.as_deref())?;
        }

        Ok(())
    }
}

/// A section counts as present once any of its credentials is set
fn any_set<F>(lookup: &F, keys: &[&str]) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().any(|key| lookup(key).is_some())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| AppError::configuration(format!("{} not set", key)))
}

/// Only the literal `true` turns sandbox mode on
fn test_mode<F>(lookup: &F, key: &str) -> GatewayEnvironment
where
    F: Fn(&str) -> Option<String>,
{
    GatewayEnvironment::from_test_mode(lookup(key).as_deref() == Some("true"))
}

fn not_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::configuration(format!("{} must not be empty", key)));
    }
    Ok(())
}

fn valid_url(key: &str, value: Option<&str>) -> Result<()> {
    if let Some(url) = value {
        reqwest::Url::parse(url)
            .map_err(|e| AppError::configuration(format!("Invalid {}: {}", key, e)))?;
    }
    Ok(())
}
