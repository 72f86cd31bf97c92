use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One externally supplied exchange rate observation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl ExchangeRate {
    pub fn new(
        from_currency: impl Into<String>,
        to_currency: impl Into<String>,
        rate: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            from_currency: from_currency.into().to_uppercase(),
            to_currency: to_currency.into().to_uppercase(),
            rate,
            timestamp,
        }
    }
}
