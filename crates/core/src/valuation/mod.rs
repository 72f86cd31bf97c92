//! Valuation projection.
//!
//! Maintains a derived, eventually-consistent market valuation per
//! portfolio from the event stream, the shared price cache, and the
//! market-data contract. Everything here is recomputable; nothing is a
//! source fact.

mod price_cache;
mod valuation_model;
mod valuation_service;


pub use price_cache::{CachedPrice, PriceCache};
pub use valuation_model::{
    HoldingValuation, PortfolioValuation, RefreshOutcome, ValuationWarning,
};
pub use valuation_service::{ValuationConfig, ValuationService, ValuationServiceTrait};
