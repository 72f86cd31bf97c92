use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical security identifier: ticker plus optional exchange code
/// (MIC-style, e.g. "XNAS").
///
/// Both components are trimmed and uppercased at construction, so two
/// symbols compare equal whenever their normalized (ticker, exchange)
/// pairs match. Displayed as `AAPL` or `AAPL:XNAS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    ticker: String,
    exchange: Option<String>,
}

impl Symbol {
    pub fn new(ticker: impl AsRef<str>) -> Self {
        Self {
            ticker: normalize(ticker.as_ref()),
            exchange: None,
        }
    }

    pub fn with_exchange(ticker: impl AsRef<str>, exchange: impl AsRef<str>) -> Self {
        let exchange = normalize(exchange.as_ref());
        Self {
            ticker: normalize(ticker.as_ref()),
            exchange: (!exchange.is_empty()).then_some(exchange),
        }
    }

    /// Parses `TICKER` or `TICKER:MIC`.
    pub fn parse(input: &str) -> Self {
        match input.split_once(':') {
            Some((ticker, exchange)) => Self::with_exchange(ticker, exchange),
            None => Self::new(input),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exchange {
            Some(exchange) => write!(f, "{}:{}", self.ticker, exchange),
            None => write!(f, "{}", self.ticker),
        }
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
