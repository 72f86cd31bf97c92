use std::sync::Arc;

use log::debug;

use super::income_model::{DateRange, IncomeReport, IncomeSummary};
use crate::errors::Result;
use crate::events::{DomainEvent, EventEnvelope, EventStore};
use crate::fx::{FxError, RateProvider};
use crate::ids::PortfolioId;

/// Pure fold of `IncomeRecorded` events into per-currency summaries.
///
/// Grouping uses the event's recorded date, never wall-clock processing
/// time. Currencies stay separate; nothing is converted here.
pub fn summarize_income<'a, I>(events: I, window: DateRange) -> IncomeReport
where
    I: IntoIterator<Item = &'a EventEnvelope>,
{
    let mut report = IncomeReport::new(window);
    for envelope in events {
        let DomainEvent::IncomeRecorded {
            symbol,
            kind,
            amount,
            date,
        } = &envelope.event
        else {
            continue;
        };
        if !window.contains(*date) {
            continue;
        }
        report
            .by_currency
            .entry(amount.currency().to_string())
            .or_insert_with(|| IncomeSummary::new(amount.currency()))
            .add_income(symbol, *kind, amount.amount(), *date);
    }
    report
}

/// Normalized variant: every amount is converted into `currency` at the
/// event's date before aggregation. A missing rate fails the whole fold -
/// partial conversions would silently distort the totals.
pub fn summarize_income_in<'a, I>(
    events: I,
    window: DateRange,
    currency: &str,
    rates: &dyn RateProvider,
) -> std::result::Result<IncomeSummary, FxError>
where
    I: IntoIterator<Item = &'a EventEnvelope>,
{
    let mut summary = IncomeSummary::new(currency.to_uppercase());
    for envelope in events {
        let DomainEvent::IncomeRecorded {
            symbol,
            kind,
            amount,
            date,
        } = &envelope.event
        else {
            continue;
        };
        if !window.contains(*date) {
            continue;
        }
        let converted = rates.convert(amount, &summary.currency, *date)?;
        summary.add_income(symbol, *kind, converted.amount(), *date);
    }
    Ok(summary)
}

pub trait IncomeServiceTrait: Send + Sync {
    /// Per-currency income summaries for one portfolio over a window.
    fn income_report(&self, portfolio_id: PortfolioId, window: DateRange) -> Result<IncomeReport>;

    /// Single-currency summary with all amounts converted.
    fn income_report_in(
        &self,
        portfolio_id: PortfolioId,
        window: DateRange,
        currency: &str,
    ) -> Result<IncomeSummary>;
}

/// Income projection over the persisted event log.
///
/// Runs on demand rather than on the live dispatch path: it reloads the
/// stream and folds, so it carries no state of its own.
pub struct IncomeService {
    event_store: Arc<dyn EventStore>,
    rates: Arc<dyn RateProvider>,
}

impl IncomeService {
    pub fn new(event_store: Arc<dyn EventStore>, rates: Arc<dyn RateProvider>) -> Self {
        Self { event_store, rates }
    }
}

impl IncomeServiceTrait for IncomeService {
    fn income_report(&self, portfolio_id: PortfolioId, window: DateRange) -> Result<IncomeReport> {
        debug!("Computing income report for portfolio {}", portfolio_id);
        let events = self.event_store.load_from(portfolio_id, 0)?;
        Ok(summarize_income(&events, window))
    }

    fn income_report_in(
        &self,
        portfolio_id: PortfolioId,
        window: DateRange,
        currency: &str,
    ) -> Result<IncomeSummary> {
        let events = self.event_store.load_from(portfolio_id, 0)?;
        Ok(summarize_income_in(
            &events,
            window,
            currency,
            self.rates.as_ref(),
        )?)
    }
}
