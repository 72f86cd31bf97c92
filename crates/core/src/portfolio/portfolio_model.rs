use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{InvestmentId, PortfolioId};
use crate::money::Money;
use foliotrack_market_data::Symbol;

/// One position: quantity held, what it cost, and the latest observed price.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub investment_id: InvestmentId,
    pub symbol: Symbol,
    pub quantity: Decimal,

    /// Per-unit cost. Weighted average across buys.
    pub unit_cost: Money,

    /// Most recent observed market price, per unit. `None` until a price
    /// observation arrives for the symbol.
    pub latest_price: Option<Money>,

    /// Observation timestamp of `latest_price`; the last-writer-wins key.
    pub priced_at: Option<DateTime<Utc>>,

    pub opened_on: NaiveDate,
}

impl Holding {
    pub fn new(
        investment_id: InvestmentId,
        symbol: Symbol,
        quantity: Decimal,
        unit_cost: Money,
        opened_on: NaiveDate,
    ) -> Self {
        Self {
            investment_id,
            symbol,
            quantity,
            unit_cost,
            latest_price: None,
            priced_at: None,
            opened_on,
        }
    }

    /// Total acquisition cost of the position.
    pub fn cost_basis(&self) -> Money {
        self.unit_cost.scale(self.quantity)
    }

    /// Latest observed price, falling back to unit cost until one arrives.
    pub fn market_price(&self) -> &Money {
        self.latest_price.as_ref().unwrap_or(&self.unit_cost)
    }

    /// Quantity times [`market_price`](Self::market_price). The value is in
    /// the price's currency; conversion to a reporting currency is the
    /// valuation projection's job.
    pub fn market_value(&self) -> Money {
        self.market_price().scale(self.quantity)
    }
}

/// Reconstructed state of one portfolio: the fold of its event stream.
///
/// Replay determinism: folding the full ordered stream from
/// [`Portfolio::new`] always reproduces this state. `last_sequence` is the
/// watermark making re-application of an already-seen event a rejected
/// no-op.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: PortfolioId,

    /// Opaque owner reference; resolved elsewhere.
    pub owner_id: Option<String>,

    pub(super) holdings: HashMap<InvestmentId, Holding>,

    /// Sequence number of the last applied event.
    pub(super) last_sequence: u64,

    pub(super) deleted: bool,
}

impl Portfolio {
    /// Empty portfolio: the valid initial (and terminal) state.
    pub fn new(id: PortfolioId) -> Self {
        Self {
            id,
            owner_id: None,
            holdings: HashMap::new(),
            last_sequence: 0,
            deleted: false,
        }
    }

    pub fn with_owner(id: PortfolioId, owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Self::new(id)
        }
    }

    pub fn holding(&self, investment_id: InvestmentId) -> Option<&Holding> {
        self.holdings.get(&investment_id)
    }

    pub fn holdings(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.values()
    }

    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Highest sequence number applied so far, 0 for a fresh portfolio.
    pub fn watermark(&self) -> u64 {
        self.last_sequence
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Sum of cost bases, per currency (no implicit conversion).
    pub fn cost_basis_by_currency(&self) -> HashMap<String, Decimal> {
        let mut totals: HashMap<String, Decimal> = HashMap::new();
        for holding in self.holdings.values() {
            let cost = holding.cost_basis();
            *totals.entry(cost.currency().to_string()).or_default() += cost.amount();
        }
        totals
    }
}
