use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::events::IncomeKind;
use foliotrack_market_data::Symbol;

/// Inclusive date window for income aggregation. `None` bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// The unbounded window.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// One calendar year.
    pub fn year(year: i32) -> Self {
        Self {
            from: NaiveDate::from_ymd_opt(year, 1, 1),
            to: NaiveDate::from_ymd_opt(year, 12, 31),
        }
    }

    /// January 1st of `today`'s year through `today`.
    pub fn year_to_date(today: NaiveDate) -> Self {
        Self {
            from: NaiveDate::from_ymd_opt(today.year(), 1, 1),
            to: Some(today),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Dividend and interest sums for one grouping bucket.
///
/// The combined total is always derived, never stored, so
/// `total() == dividends + interest` holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTotals {
    pub dividends: Decimal,
    pub interest: Decimal,
}

impl IncomeTotals {
    pub fn add(&mut self, kind: IncomeKind, amount: Decimal) {
        match kind {
            IncomeKind::Dividend => self.dividends += amount,
            IncomeKind::Interest => self.interest += amount,
        }
    }

    pub fn total(&self) -> Decimal {
        self.dividends + self.interest
    }
}

/// Income aggregation for one currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSummary {
    pub currency: String,

    /// Keyed by the symbol's display form (`AAPL`, `SHOP:XTSE`).
    pub by_symbol: BTreeMap<String, IncomeTotals>,

    /// Keyed by calendar month of the event's recorded date, `YYYY-MM`.
    pub by_month: BTreeMap<String, IncomeTotals>,

    pub total_dividends: Decimal,
    pub total_interest: Decimal,
}

impl IncomeSummary {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            by_symbol: BTreeMap::new(),
            by_month: BTreeMap::new(),
            total_dividends: Decimal::ZERO,
            total_interest: Decimal::ZERO,
        }
    }

    /// Folds one payment into every grouping.
    pub fn add_income(&mut self, symbol: &Symbol, kind: IncomeKind, amount: Decimal, date: NaiveDate) {
        self.by_symbol
            .entry(symbol.to_string())
            .or_default()
            .add(kind, amount);
        self.by_month
            .entry(month_key(date))
            .or_default()
            .add(kind, amount);
        match kind {
            IncomeKind::Dividend => self.total_dividends += amount,
            IncomeKind::Interest => self.total_interest += amount,
        }
    }

    /// `total_dividends + total_interest`, by definition.
    pub fn total_income(&self) -> Decimal {
        self.total_dividends + self.total_interest
    }

    /// Average monthly income over the months present in the summary.
    pub fn monthly_average(&self) -> Decimal {
        let months = self.by_month.len() as i64;
        if months == 0 {
            return Decimal::ZERO;
        }
        (self.total_income() / Decimal::from(months)).round_dp(DISPLAY_DECIMAL_PRECISION)
    }
}

/// Income summaries per currency over one window.
///
/// Currencies are never merged implicitly; a cross-currency total requires
/// the normalized variant of the fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeReport {
    pub window: DateRange,
    pub by_currency: BTreeMap<String, IncomeSummary>,
}

impl IncomeReport {
    pub fn new(window: DateRange) -> Self {
        Self {
            window,
            by_currency: BTreeMap::new(),
        }
    }

    pub fn summary(&self, currency: &str) -> Option<&IncomeSummary> {
        self.by_currency.get(currency)
    }

    pub fn is_empty(&self) -> bool {
        self.by_currency.is_empty()
    }
}

pub(super) fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
