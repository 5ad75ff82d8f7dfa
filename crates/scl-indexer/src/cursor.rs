use serde::{Deserialize, Serialize};

use scl_ledger::EventId;

/// Persisted consumption position over the event log.
///
/// The cursor stores the next position to poll, so a restarted indexer
/// resumes exactly where it stopped. Serialize it wherever the operator
/// keeps indexer state; re-reading an already-applied suffix is safe
/// because applies are idempotent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCursor {
    next: EventId,
}

impl IndexCursor {
    /// A cursor at the very start of the log.
    pub fn genesis() -> Self {
        Self {
            next: EventId::genesis(),
        }
    }

    /// The next position to poll from.
    pub fn position(&self) -> EventId {
        self.next
    }

    /// Move the cursor just past an applied event.
    pub fn advance_past(&mut self, id: EventId) {
        let successor = id.next();
        if successor > self.next {
            self.next = successor;
        }
    }
}

impl Default for IndexCursor {
    fn default() -> Self {
        Self::genesis()
    }
}
