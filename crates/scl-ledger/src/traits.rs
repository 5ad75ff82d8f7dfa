use scl_types::BatchState;

use crate::error::LedgerError;
use crate::records::{AuthenticityReport, CustodyTransfer, EventId, EventRecord};

/// Read boundary the projection indexer uses to re-query authoritative
/// state while applying events. Implementations may fail transiently;
/// the indexer treats such failures as recoverable.
pub trait LedgerQuery: Send + Sync {
    fn verify_authenticity(&self, id: u64) -> Result<AuthenticityReport, LedgerError>;

    fn batch_state(&self, id: u64) -> Result<BatchState, LedgerError>;
}

/// Read boundary over the event log for subscribers.
///
/// Delivery to a consumer is at-least-once: a feed may hand out the same
/// record again on a later poll, and consumers must dedupe by
/// [`EventId`].
pub trait EventFeed: Send + Sync {
    /// Records at or after `from`, in log order.
    fn events_from(&self, from: EventId) -> Result<Vec<EventRecord>, LedgerError>;

    /// Identity of the most recent event, if any.
    fn head(&self) -> Result<Option<EventId>, LedgerError>;
}

/// External custody hand-off, invoked after a transfer has been
/// committed. The ledger guarantees the batch's state and custody count
/// are already updated (and its lock released) when this runs, so a
/// re-entrant read observes the post-transfer state.
pub trait CustodyHook: Send + Sync {
    fn on_custody_transfer(&self, transfer: &CustodyTransfer);
}
