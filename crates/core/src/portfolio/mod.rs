//! Portfolio aggregate.
//!
//! The aggregate is the consistency boundary: its state is rebuilt by
//! folding the portfolio's event stream, and every mutation goes through
//! the pure [`Portfolio::apply`] in `aggregate.rs`.

mod aggregate;
mod portfolio_errors;
mod portfolio_model;


pub use portfolio_errors::PortfolioError;
pub use portfolio_model::{Holding, Portfolio};
