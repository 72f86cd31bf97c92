//! Foliotrack Core - event-sourced portfolio domain.
//!
//! This crate contains the portfolio aggregate, its domain events, the
//! in-process event dispatcher, and the valuation and income projections.
//! It is storage-agnostic: the event log, market data, FX rates, and
//! notifications are all reached through traits implemented by collaborators.

pub mod constants;
pub mod errors;
pub mod events;
pub mod fx;
pub mod ids;
pub mod income;
pub mod ingestion;
pub mod money;
pub mod notifications;
pub mod portfolio;
pub mod utils;
pub mod valuation;

// Re-export the value objects shared with the market data boundary
pub use foliotrack_market_data::{Quote, SearchResult, Symbol};

// Re-export common domain types
pub use ids::{InvestmentId, PortfolioId};
pub use money::Money;
pub use portfolio::{Holding, Portfolio};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
