//! Market data contract for Foliotrack.
//!
//! This crate defines the boundary between the portfolio core and external
//! market data sources: the instrument and quote models, the error taxonomy
//! with retry classification, and the [`MarketDataProvider`] trait that
//! concrete providers implement. It deliberately contains no transport code;
//! fetching, caching, and provider-side retries live behind the trait.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::{MarketDataError, RetryClass};
pub use models::{PricePoint, Quote, SearchResult, SecurityKind, Symbol};
pub use provider::MarketDataProvider;
