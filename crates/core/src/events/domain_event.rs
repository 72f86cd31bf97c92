//! Domain event types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{InvestmentId, PortfolioId};
use crate::money::Money;
use foliotrack_market_data::Symbol;

/// Income classification carried by [`DomainEvent::IncomeRecorded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeKind {
    Dividend,
    Interest,
}

/// Immutable facts recorded in a portfolio's event stream.
///
/// Events describe what happened, never what should happen; command
/// validation lives upstream, and the aggregate re-checks its invariants on
/// apply. Prices are per unit throughout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A new position was opened.
    InvestmentAdded {
        investment_id: InvestmentId,
        symbol: Symbol,
        quantity: Decimal,
        purchase_price: Money,
        purchase_date: NaiveDate,
    },

    /// Additional shares were bought into an existing position. Cost basis
    /// becomes the weighted average of old and new shares.
    SharesBought {
        investment_id: InvestmentId,
        quantity: Decimal,
        price: Money,
        date: NaiveDate,
    },

    /// Shares were sold out of an existing position.
    SharesSold {
        investment_id: InvestmentId,
        quantity: Decimal,
        date: NaiveDate,
    },

    /// A position was closed and removed from the portfolio.
    InvestmentRemoved {
        investment_id: InvestmentId,
        date: NaiveDate,
    },

    /// A market price was observed for a symbol.
    PriceObserved {
        symbol: Symbol,
        price: Money,
        observed_at: DateTime<Utc>,
        source: String,
    },

    /// A dividend or interest payment was received.
    IncomeRecorded {
        symbol: Symbol,
        kind: IncomeKind,
        amount: Money,
        date: NaiveDate,
    },

    /// The portfolio was deleted. Tombstone: the aggregate accepts nothing
    /// after this, and projections drop their derived state.
    PortfolioDeleted { date: NaiveDate },
}

/// Variant tag used as the dispatcher routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    InvestmentAdded,
    SharesBought,
    SharesSold,
    InvestmentRemoved,
    PriceObserved,
    IncomeRecorded,
    PortfolioDeleted,
}

impl EventKind {
    /// Every variant, for handlers that subscribe to the whole stream.
    pub const ALL: [EventKind; 7] = [
        EventKind::InvestmentAdded,
        EventKind::SharesBought,
        EventKind::SharesSold,
        EventKind::InvestmentRemoved,
        EventKind::PriceObserved,
        EventKind::IncomeRecorded,
        EventKind::PortfolioDeleted,
    ];
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::InvestmentAdded { .. } => EventKind::InvestmentAdded,
            Self::SharesBought { .. } => EventKind::SharesBought,
            Self::SharesSold { .. } => EventKind::SharesSold,
            Self::InvestmentRemoved { .. } => EventKind::InvestmentRemoved,
            Self::PriceObserved { .. } => EventKind::PriceObserved,
            Self::IncomeRecorded { .. } => EventKind::IncomeRecorded,
            Self::PortfolioDeleted { .. } => EventKind::PortfolioDeleted,
        }
    }

    /// Creates an InvestmentAdded event.
    pub fn investment_added(
        investment_id: InvestmentId,
        symbol: Symbol,
        quantity: Decimal,
        purchase_price: Money,
        purchase_date: NaiveDate,
    ) -> Self {
        Self::InvestmentAdded {
            investment_id,
            symbol,
            quantity,
            purchase_price,
            purchase_date,
        }
    }

    /// Creates a SharesBought event.
    pub fn shares_bought(
        investment_id: InvestmentId,
        quantity: Decimal,
        price: Money,
        date: NaiveDate,
    ) -> Self {
        Self::SharesBought {
            investment_id,
            quantity,
            price,
            date,
        }
    }

    /// Creates a SharesSold event.
    pub fn shares_sold(investment_id: InvestmentId, quantity: Decimal, date: NaiveDate) -> Self {
        Self::SharesSold {
            investment_id,
            quantity,
            date,
        }
    }

    /// Creates an InvestmentRemoved event.
    pub fn investment_removed(investment_id: InvestmentId, date: NaiveDate) -> Self {
        Self::InvestmentRemoved {
            investment_id,
            date,
        }
    }

    /// Creates a PriceObserved event.
    pub fn price_observed(
        symbol: Symbol,
        price: Money,
        observed_at: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self::PriceObserved {
            symbol,
            price,
            observed_at,
            source: source.into(),
        }
    }

    /// Creates an IncomeRecorded event.
    pub fn income_recorded(
        symbol: Symbol,
        kind: IncomeKind,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self::IncomeRecorded {
            symbol,
            kind,
            amount,
            date,
        }
    }

    /// Creates a PortfolioDeleted event.
    pub fn portfolio_deleted(date: NaiveDate) -> Self {
        Self::PortfolioDeleted { date }
    }
}

/// A domain event as it exists in the log: payload plus stream position.
///
/// `sequence` is monotonically increasing per portfolio and is the
/// idempotency key for aggregates and projections alike. Envelopes are
/// immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub portfolio_id: PortfolioId,
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(
        portfolio_id: PortfolioId,
        sequence: u64,
        recorded_at: DateTime<Utc>,
        event: DomainEvent,
    ) -> Self {
        Self {
            portfolio_id,
            sequence,
            recorded_at,
            event,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_domain_event_serialization() {
        let event = DomainEvent::investment_added(
            InvestmentId::new(),
            Symbol::parse("AAPL:XNAS"),
            dec!(10),
            Money::new(dec!(150), "USD").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"investment_added\""));

        let deserialized: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[test]
    fn test_envelope_round_trip_keeps_sequence() {
        let envelope = EventEnvelope::new(
            PortfolioId::new(),
            42,
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
            DomainEvent::income_recorded(
                Symbol::new("AAPL"),
                IncomeKind::Dividend,
                Money::new(dec!(5), "USD").unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            ),
        );

        let json = serde_json::to_string(&envelope).unwrap();
        let back: EventEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sequence, 42);
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_kind_matches_variant() {
        let event = DomainEvent::portfolio_deleted(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(event.kind(), EventKind::PortfolioDeleted);
        assert!(EventKind::ALL.contains(&event.kind()));
    }
}
