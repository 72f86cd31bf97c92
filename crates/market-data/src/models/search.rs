use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// Coarse instrument classification reported by search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityKind {
    #[default]
    Equity,
    Etf,
    MutualFund,
    Bond,
    Crypto,
    Other,
}

/// One match from a security search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub symbol: Symbol,
    pub name: String,
    pub kind: SecurityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    pub currency: String,
}
