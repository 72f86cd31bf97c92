//! Domain events module.
//!
//! Provides the event sum type and envelope, the in-process dispatcher that
//! fans envelopes out to registered handlers, and the append-only event
//! store contract. The log is the source of truth: aggregates and
//! projections are folds over it.

mod dispatcher;
mod domain_event;
mod store;

pub use dispatcher::*;
pub use domain_event::*;
pub use store::*;
