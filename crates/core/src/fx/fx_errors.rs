use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    /// No rate (direct or via cross rates) is known for the pair.
    #[error("Missing exchange rate {from}->{to}")]
    MissingExchangeRate { from: String, to: String },

    /// A supplied rate was unusable (zero, negative).
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
}
