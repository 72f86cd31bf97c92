//! Append-only event log contract and in-memory reference implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use super::domain_event::EventEnvelope;
use crate::ids::PortfolioId;

#[derive(Error, Debug)]
pub enum EventStoreError {
    /// The appended sequence is not exactly one past the stream head.
    /// The log is the source of truth, so gaps and rewinds are refused here
    /// even though aggregates tolerate gaps on replay.
    #[error("Out-of-order append for portfolio {portfolio_id}: sequence {sequence}, head {head}")]
    OutOfOrderAppend {
        portfolio_id: PortfolioId,
        sequence: u64,
        head: u64,
    },

    /// Storage-collaborator failure, already stringified by the adapter.
    #[error("Event store backend error: {0}")]
    Backend(String),
}

/// What the core requires from the persisted event log.
///
/// Durable storage technology is a collaborator's concern; these are the
/// only two operations the core calls.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one envelope to its portfolio's stream.
    async fn append(&self, envelope: EventEnvelope) -> Result<(), EventStoreError>;

    /// Loads a portfolio's envelopes with sequence strictly greater than
    /// `after_sequence`, in log order. `after_sequence = 0` loads the full
    /// stream.
    fn load_from(
        &self,
        portfolio_id: PortfolioId,
        after_sequence: u64,
    ) -> Result<Vec<EventEnvelope>, EventStoreError>;
}

/// In-memory event store: the reference semantics, and the test double.
#[derive(Default)]
pub struct InMemoryEventStore {
    streams: DashMap<PortfolioId, Vec<EventEnvelope>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence of the last appended envelope, 0 for an empty stream.
    pub fn head(&self, portfolio_id: PortfolioId) -> u64 {
        self.streams
            .get(&portfolio_id)
            .and_then(|stream| stream.last().map(|e| e.sequence))
            .unwrap_or(0)
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, envelope: EventEnvelope) -> Result<(), EventStoreError> {
        let mut stream = self.streams.entry(envelope.portfolio_id).or_default();
        let head = stream.last().map(|e| e.sequence).unwrap_or(0);
        if envelope.sequence != head + 1 {
            return Err(EventStoreError::OutOfOrderAppend {
                portfolio_id: envelope.portfolio_id,
                sequence: envelope.sequence,
                head,
            });
        }
        stream.push(envelope);
        Ok(())
    }

    fn load_from(
        &self,
        portfolio_id: PortfolioId,
        after_sequence: u64,
    ) -> Result<Vec<EventEnvelope>, EventStoreError> {
        Ok(self
            .streams
            .get(&portfolio_id)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|e| e.sequence > after_sequence)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
