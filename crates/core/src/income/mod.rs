//! Income projection.
//!
//! Pure aggregation over `IncomeRecorded` events: dividend and interest
//! totals grouped by symbol and by calendar month, kept per currency
//! unless the caller asks for normalization through a rate provider.

mod income_model;
mod income_service;

pub use income_model::{DateRange, IncomeReport, IncomeSummary, IncomeTotals};
pub use income_service::{
    summarize_income, summarize_income_in, IncomeService, IncomeServiceTrait,
};
