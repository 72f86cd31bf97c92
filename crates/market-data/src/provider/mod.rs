//! Market data provider contract.

mod traits;

pub use traits::MarketDataProvider;
