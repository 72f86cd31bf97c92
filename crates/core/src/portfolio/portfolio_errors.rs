use rust_decimal::Decimal;
use thiserror::Error;

use crate::ids::{InvestmentId, PortfolioId};

/// Validation failures raised by the aggregate when applying an event.
///
/// An event that triggers one of these is rejected whole: the prior state
/// is never partially modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    #[error("Investment {investment_id} already exists in the portfolio")]
    DuplicateInvestment { investment_id: InvestmentId },

    #[error("Investment {investment_id} is not part of the portfolio")]
    UnknownInvestment { investment_id: InvestmentId },

    #[error("Insufficient quantity for investment {investment_id}: held {held}, requested {requested}")]
    InsufficientQuantity {
        investment_id: InvestmentId,
        held: Decimal,
        requested: Decimal,
    },

    #[error("Event sequence {sequence} is at or below the portfolio watermark {watermark}")]
    OutOfOrderEvent { sequence: u64, watermark: u64 },

    #[error("Event belongs to portfolio {got}, aggregate is {expected}")]
    EventPortfolioMismatch {
        expected: PortfolioId,
        got: PortfolioId,
    },

    #[error("Portfolio {portfolio_id} is deleted and accepts no further events")]
    Tombstoned { portfolio_id: PortfolioId },

    #[error("Investment {investment_id} is costed in {position_currency}, event carries {event_currency}. Requires currency conversion upstream.")]
    CurrencyMismatch {
        investment_id: InvestmentId,
        position_currency: String,
        event_currency: String,
    },

    #[error("Quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: Decimal },

    #[error("Unit price must be positive, got {price}")]
    InvalidPrice { price: Decimal },
}
