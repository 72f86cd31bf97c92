/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Default maximum age of a cached price before the valuation projection
/// consults the market data provider again, in seconds.
pub const DEFAULT_PRICE_MAX_AGE_SECS: u64 = 900;

/// Default upper bound on a single market data lookup, in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Default upper bound on a single notification delivery, in seconds.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 5;

/// Fallback reporting currency when none is configured.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";
