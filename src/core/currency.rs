use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies accepted by the LATAM gateways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Colombian Peso
    COP,
    /// Argentine Peso
    ARS,
    /// Brazilian Real
    BRL,
    /// Mexican Peso
    MXN,
    /// Chilean Peso
    CLP,
    /// Uruguayan Peso
    UYU,
    /// Peruvian Sol
    PEN,
    /// US Dollar (international donations)
    USD,
}

impl Currency {
    pub const ALL: [Currency; 8] = [
        Currency::COP,
        Currency::ARS,
        Currency::BRL,
        Currency::MXN,
        Currency::CLP,
        Currency::UYU,
        Currency::PEN,
        Currency::USD,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::COP => "COP",
            Currency::ARS => "ARS",
            Currency::BRL => "BRL",
            Currency::MXN => "MXN",
            Currency::CLP => "CLP",
            Currency::UYU => "UYU",
            Currency::PEN => "PEN",
            Currency::USD => "USD",
        }
    }

    /// Looks up a currency code, falling back to USD for anything unknown
    pub fn from_code_or_usd(code: &str) -> Currency {
        code.parse().unwrap_or(Currency::USD)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| format!("Invalid currency: {}", s))
    }
}

/// Converts a major-unit amount to minor units (cents)
///
/// Half cents round away from zero, so 10.505 becomes 1051.
pub fn to_minor_units(amount: Decimal) -> Result<i64, String> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
        .ok_or_else(|| format!("Amount {} does not fit in minor units", amount))
}

/// Converts minor units (cents) back to a major-unit amount
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, 2)
}
