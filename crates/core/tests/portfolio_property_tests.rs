//! Property-based tests for the portfolio aggregate and income projection.
//!
//! These tests verify that universal properties hold across all valid
//! inputs, using the `proptest` crate for random test case generation.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use foliotrack_core::events::{DomainEvent, EventEnvelope, IncomeKind};
use foliotrack_core::income::{summarize_income, DateRange};
use foliotrack_core::{InvestmentId, Money, Portfolio, PortfolioId, Symbol};

// =============================================================================
// Generators
// =============================================================================

static TICKERS: &[&str] = &["AAPL", "MSFT", "SHOP", "SAP"];

fn arb_ticker() -> impl Strategy<Value = &'static str> {
    prop::sample::select(TICKERS)
}

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000).prop_map(Decimal::from)
}

fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..=2025, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_income_kind() -> impl Strategy<Value = IncomeKind> {
    prop_oneof![Just(IncomeKind::Dividend), Just(IncomeKind::Interest)]
}

/// An abstract step in a portfolio's life. Steps are turned into events
/// against the evolving state so the generated stream is always valid.
#[derive(Debug, Clone)]
enum Step {
    Add {
        ticker: &'static str,
        quantity: Decimal,
        price: Decimal,
        date: NaiveDate,
    },
    Buy {
        position: usize,
        quantity: Decimal,
        price: Decimal,
        date: NaiveDate,
    },
    /// Sells a fraction (percent) of the chosen position.
    Sell {
        position: usize,
        percent: u8,
        date: NaiveDate,
    },
    Remove {
        position: usize,
        date: NaiveDate,
    },
    Price {
        ticker: &'static str,
        price: Decimal,
        hour_offset: i64,
    },
    Income {
        ticker: &'static str,
        kind: IncomeKind,
        amount: Decimal,
        date: NaiveDate,
    },
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (arb_ticker(), arb_quantity(), arb_price(), arb_date()).prop_map(
            |(ticker, quantity, price, date)| Step::Add {
                ticker,
                quantity,
                price,
                date,
            }
        ),
        (any::<usize>(), arb_quantity(), arb_price(), arb_date()).prop_map(
            |(position, quantity, price, date)| Step::Buy {
                position,
                quantity,
                price,
                date,
            }
        ),
        (any::<usize>(), 1u8..=100, arb_date()).prop_map(|(position, percent, date)| Step::Sell {
            position,
            percent,
            date,
        }),
        (any::<usize>(), arb_date()).prop_map(|(position, date)| Step::Remove { position, date }),
        (arb_ticker(), arb_price(), 0i64..48).prop_map(|(ticker, price, hour_offset)| {
            Step::Price {
                ticker,
                price,
                hour_offset,
            }
        }),
        (arb_ticker(), arb_income_kind(), arb_price(), arb_date()).prop_map(
            |(ticker, kind, amount, date)| Step::Income {
                ticker,
                kind,
                amount,
                date,
            }
        ),
    ]
}

fn usd(amount: Decimal) -> Money {
    Money::new(amount, "USD").unwrap()
}

/// Materializes steps into a valid event stream by replaying against the
/// live state; steps that would be invalid are skipped.
fn build_stream(portfolio_id: PortfolioId, steps: Vec<Step>) -> Vec<EventEnvelope> {
    let mut state = Portfolio::new(portfolio_id);
    let mut events = Vec::new();
    let mut sequence = 0u64;
    let recorded_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    for step in steps {
        let open_positions: Vec<InvestmentId> =
            state.holdings().map(|h| h.investment_id).collect();

        let event = match step {
            Step::Add {
                ticker,
                quantity,
                price,
                date,
            } => Some(DomainEvent::investment_added(
                InvestmentId::new(),
                Symbol::new(ticker),
                quantity,
                usd(price),
                date,
            )),
            Step::Buy {
                position,
                quantity,
                price,
                date,
            } => (!open_positions.is_empty()).then(|| {
                DomainEvent::shares_bought(
                    open_positions[position % open_positions.len()],
                    quantity,
                    usd(price),
                    date,
                )
            }),
            Step::Sell {
                position,
                percent,
                date,
            } => {
                if open_positions.is_empty() {
                    None
                } else {
                    let id = open_positions[position % open_positions.len()];
                    let held = state.holding(id).unwrap().quantity;
                    let quantity = (held * Decimal::from(percent) / Decimal::from(100u8))
                        .round_dp(4);
                    (quantity > Decimal::ZERO)
                        .then(|| DomainEvent::shares_sold(id, quantity, date))
                }
            }
            Step::Remove { position, date } => (!open_positions.is_empty()).then(|| {
                DomainEvent::investment_removed(
                    open_positions[position % open_positions.len()],
                    date,
                )
            }),
            Step::Price {
                ticker,
                price,
                hour_offset,
            } => Some(DomainEvent::price_observed(
                Symbol::new(ticker),
                usd(price),
                recorded_at + chrono::Duration::hours(hour_offset),
                "PROP",
            )),
            Step::Income {
                ticker,
                kind,
                amount,
                date,
            } => Some(DomainEvent::income_recorded(
                Symbol::new(ticker),
                kind,
                usd(amount),
                date,
            )),
        };

        let Some(event) = event else { continue };
        sequence += 1;
        let envelope = EventEnvelope::new(portfolio_id, sequence, recorded_at, event);
        state = state
            .apply(&envelope)
            .expect("generated event must be valid");
        events.push(envelope);
    }

    events
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Loading a prefix and applying the suffix matches loading the whole
    /// stream, for every split point.
    #[test]
    fn prop_replay_deterministic_at_every_split(steps in prop::collection::vec(arb_step(), 0..40)) {
        let portfolio_id = PortfolioId::new();
        let events = build_stream(portfolio_id, steps);
        let full = Portfolio::load(portfolio_id, &events).unwrap();

        for split in 0..=events.len() {
            let (head, tail) = events.split_at(split);
            let prefix = Portfolio::load(portfolio_id, head).unwrap();
            let resumed = tail
                .iter()
                .try_fold(prefix, |state, envelope| state.apply(envelope))
                .unwrap();
            prop_assert_eq!(&resumed, &full);
        }
    }

    /// Re-applying any event from the stream is rejected and leaves the
    /// state bit-identical.
    #[test]
    fn prop_reapply_is_noop(steps in prop::collection::vec(arb_step(), 1..30)) {
        let portfolio_id = PortfolioId::new();
        let events = build_stream(portfolio_id, steps);
        let state = Portfolio::load(portfolio_id, &events).unwrap();

        for envelope in &events {
            prop_assert!(state.apply(envelope).is_err());
        }
        // Rejection mutated nothing: a fresh replay still matches.
        prop_assert_eq!(&Portfolio::load(portfolio_id, &events).unwrap(), &state);
    }

    /// No valid stream ever drives a holding quantity negative.
    #[test]
    fn prop_quantities_never_negative(steps in prop::collection::vec(arb_step(), 0..60)) {
        let portfolio_id = PortfolioId::new();
        let events = build_stream(portfolio_id, steps);

        let mut state = Portfolio::new(portfolio_id);
        for envelope in &events {
            state = state.apply(envelope).unwrap();
            for holding in state.holdings() {
                prop_assert!(holding.quantity >= Decimal::ZERO);
            }
        }
    }

    /// Income additivity holds for every generated stream and window.
    #[test]
    fn prop_income_totals_add_up(
        steps in prop::collection::vec(arb_step(), 0..60),
        year in 2020i32..=2025,
    ) {
        let portfolio_id = PortfolioId::new();
        let events = build_stream(portfolio_id, steps);

        for window in [DateRange::all(), DateRange::year(year)] {
            let report = summarize_income(&events, window);
            for summary in report.by_currency.values() {
                prop_assert_eq!(
                    summary.total_income(),
                    summary.total_dividends + summary.total_interest
                );
                let month_sum: Decimal =
                    summary.by_month.values().map(|totals| totals.total()).sum();
                prop_assert_eq!(month_sum, summary.total_income());
                let symbol_sum: Decimal =
                    summary.by_symbol.values().map(|totals| totals.total()).sum();
                prop_assert_eq!(symbol_sum, summary.total_income());
            }
        }
    }
}
