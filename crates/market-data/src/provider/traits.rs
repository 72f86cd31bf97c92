//! Market data provider trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::MarketDataError;
use crate::models::{PricePoint, Quote, SearchResult, Symbol};

/// Contract every market data source implements.
///
/// All calls are read-only and side-effect-free from the portfolio core's
/// perspective. Implementations own their transport, caching, and retry
/// details; the core only sees quotes or a classified error.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// A constant string like "YAHOO" or "MANUAL", used for logging and
    /// error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    async fn get_latest_quote(&self, symbol: &Symbol) -> Result<Quote, MarketDataError>;

    /// Fetch historical prices for a symbol over `[start, end]`, ordered by
    /// timestamp ascending.
    async fn get_historical_quotes(
        &self,
        symbol: &Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, MarketDataError>;

    /// Search for securities matching the query.
    ///
    /// Default implementation reports `NotSupported`; providers without a
    /// search endpoint don't need to override it.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let _ = query;
        Err(MarketDataError::NotSupported {
            operation: "search".to_string(),
        })
    }
}
