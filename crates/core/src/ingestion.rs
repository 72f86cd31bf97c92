//! Transaction ingestion contract.
//!
//! The shape of an already-validated transaction row handed over by the
//! import layer (CSV, broker sync). Parsing and row-level validation live
//! upstream; the command layer translates these records into domain events
//! before anything reaches the aggregate.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use foliotrack_market_data::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    Dividend,
    Interest,
}

/// One validated transaction record ready for translation into events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionToImport {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub symbol: Symbol,
    pub currency: String,

    /// Shares moved; `None` for pure cash income rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,

    /// Per-unit price for buys and sells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Cash amount for dividend and interest rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
