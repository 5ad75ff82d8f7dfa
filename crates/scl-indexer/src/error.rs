use scl_ledger::EventId;

/// Errors produced by indexer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexerError {
    /// A transfer or recall event referenced a batch with no projection
    /// row. Only raised in strict mode; lenient mode logs and drops.
    #[error("no batch projection for batch {batch_id} while applying event {event}")]
    MissingBatchRow { batch_id: u64, event: EventId },

    /// The event feed itself failed; the consumption loop can retry.
    #[error("event feed error: {0}")]
    Feed(String),
}

/// Convenience alias for indexer results.
pub type IndexerResult<T> = Result<T, IndexerError>;
