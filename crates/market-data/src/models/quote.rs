use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// Latest observed price for an instrument, as returned by a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument the quote is for.
    pub symbol: Symbol,

    /// When the price was observed at the source.
    pub timestamp: DateTime<Utc>,

    /// Last traded / closing price.
    pub price: Decimal,

    /// Quote currency (ISO 4217 code).
    pub currency: String,

    /// Provider that produced the quote ("YAHOO", "MANUAL", ...).
    pub source: String,
}

impl Quote {
    pub fn new(
        symbol: Symbol,
        timestamp: DateTime<Utc>,
        price: Decimal,
        currency: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            timestamp,
            price,
            currency: currency.into(),
            source: source.into(),
        }
    }
}

/// Single point in a historical price series.
///
/// OHLC fields are optional because several sources only publish a daily
/// close for funds and thinly traded instruments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    pub close: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    pub currency: String,
}

impl PricePoint {
    /// Close-only point, the minimum every provider can supply.
    pub fn close_only(timestamp: DateTime<Utc>, close: Decimal, currency: impl Into<String>) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
            currency: currency.into(),
        }
    }
}
