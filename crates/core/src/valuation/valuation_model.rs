//! Valuation projection models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{InvestmentId, PortfolioId};
use crate::money::Money;
use foliotrack_market_data::Symbol;

/// Problems encountered while deriving a valuation.
///
/// These are attached to the result instead of failing it: the projection
/// always returns the best value it can compute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValuationWarning {
    /// No conversion path for the pair; the holding's value is reported in
    /// its local currency and excluded from the converted total.
    MissingExchangeRate { from: String, to: String },

    /// Market data lookup failed; the last known price was used.
    PriceLookupFailed { symbol: Symbol, reason: String },

    /// The cached price is older than the configured maximum age and could
    /// not be refreshed.
    StalePrice {
        symbol: Symbol,
        observed_at: DateTime<Utc>,
    },
}

/// Current value of one holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingValuation {
    pub investment_id: InvestmentId,
    pub symbol: Symbol,
    pub quantity: Decimal,

    /// Per-unit price used for this valuation, in its own currency.
    pub price: Money,

    /// Quantity times price, in the price's currency.
    pub market_value: Money,

    /// Market value in the requested reporting currency; `None` when the
    /// rate was missing.
    pub converted_value: Option<Decimal>,

    /// When the price was observed; `None` when cost basis was used.
    pub priced_at: Option<DateTime<Utc>>,
}

/// Derived valuation of one portfolio, in a requested currency.
///
/// Never persisted as a source fact - always recomputable from the event
/// stream plus latest prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub portfolio_id: PortfolioId,

    /// Requested reporting currency.
    pub currency: String,

    /// Sum of converted holding values. Holdings with a missing rate are
    /// excluded and flagged in `warnings`.
    pub total_value: Decimal,

    pub holdings: Vec<HoldingValuation>,
    pub warnings: Vec<ValuationWarning>,

    /// Event stream position this valuation reflects.
    pub last_sequence: u64,

    pub calculated_at: DateTime<Utc>,
}

impl PortfolioValuation {
    pub fn empty(portfolio_id: PortfolioId, currency: impl Into<String>) -> Self {
        Self {
            portfolio_id,
            currency: currency.into(),
            total_value: Decimal::ZERO,
            holdings: Vec::new(),
            warnings: Vec::new(),
            last_sequence: 0,
            calculated_at: Utc::now(),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Result of a valuation refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Updated(PortfolioValuation),

    /// The caller cancelled mid-flight; cached state was left untouched.
    Cancelled,
}
