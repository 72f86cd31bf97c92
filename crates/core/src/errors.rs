//! Core error types for the Foliotrack domain.
//!
//! Module-specific error enums are defined next to the code they describe
//! and converted into this root type at the crate boundary.

use thiserror::Error;

use crate::events::EventStoreError;
use crate::fx::FxError;
use crate::money::MoneyError;
use crate::portfolio::PortfolioError;
use foliotrack_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the portfolio core.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Portfolio event rejected: {0}")]
    Portfolio(#[from] PortfolioError),

    #[error("Event store operation failed: {0}")]
    EventStore(#[from] EventStoreError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
