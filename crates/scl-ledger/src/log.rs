use serde::{Deserialize, Serialize};

use scl_types::{AccountId, Timestamp};

use crate::records::{DomainEvent, EventId, EventRecord};

/// The append-only, totally ordered sequence of domain events.
///
/// Only the ledger writes to it; everything else reads. Events are keyed
/// by `(block, log_index)`: the block is the position of the enclosing
/// transaction in the ledger's serial execution order, the log index the
/// event's position within that transaction.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event in the given block. Log indices are assigned
    /// consecutively within a block; blocks must be appended in order.
    pub fn append(
        &mut self,
        block: u64,
        tx_ref: [u8; 32],
        timestamp: Timestamp,
        event: DomainEvent,
    ) -> EventId {
        let log_index = match self.records.last() {
            Some(last) if last.id.block == block => last.id.log_index + 1,
            _ => 0,
        };
        debug_assert!(
            self.records
                .last()
                .map(|last| block >= last.id.block)
                .unwrap_or(true),
            "event log blocks must be appended in order"
        );
        let id = EventId::new(block, log_index);
        self.records.push(EventRecord {
            id,
            timestamp,
            tx_ref,
            event,
        });
        id
    }

    /// All records, in log order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identity of the most recent event, if any.
    pub fn head(&self) -> Option<EventId> {
        self.records.last().map(|r| r.id)
    }

    /// Records at or after `from`, in log order. The log is sorted by
    /// construction, so this is a suffix.
    pub fn read_from(&self, from: EventId) -> Vec<EventRecord> {
        let start = self.records.partition_point(|r| r.id < from);
        self.records[start..].to_vec()
    }
}

/// Deterministic transaction reference for one ledger operation.
pub fn transaction_ref(block: u64, actor: &AccountId, intent: &str) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"scl-tx-v1:");
    hasher.update(&block.to_le_bytes());
    hasher.update(actor.as_bytes());
    hasher.update(b":");
    hasher.update(intent.as_bytes());
    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> AccountId {
        AccountId::from_raw([1; 32])
    }

    fn recalled(batch_id: u64) -> DomainEvent {
        DomainEvent::BatchRecalled { batch_id }
    }

    #[test]
    fn append_assigns_consecutive_indices_within_a_block() {
        let mut log = EventLog::new();
        let tx = transaction_ref(1, &actor(), "test");
        let a = log.append(1, tx, Timestamp::zero(), recalled(1));
        let b = log.append(1, tx, Timestamp::zero(), recalled(2));
        let c = log.append(2, tx, Timestamp::zero(), recalled(3));

        assert_eq!(a, EventId::new(1, 0));
        assert_eq!(b, EventId::new(1, 1));
        assert_eq!(c, EventId::new(2, 0));
        assert_eq!(log.head(), Some(c));
    }

    #[test]
    fn read_from_returns_suffix() {
        let mut log = EventLog::new();
        let tx = transaction_ref(1, &actor(), "test");
        log.append(1, tx, Timestamp::zero(), recalled(1));
        log.append(2, tx, Timestamp::zero(), recalled(2));
        log.append(3, tx, Timestamp::zero(), recalled(3));

        let tail = log.read_from(EventId::new(2, 0));
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].id, EventId::new(2, 0));

        // A cursor past the head reads nothing.
        assert!(log.read_from(EventId::new(3, 1)).is_empty());
        // The genesis cursor reads everything.
        assert_eq!(log.read_from(EventId::genesis()).len(), 3);
    }

    #[test]
    fn empty_log() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.head(), None);
        assert!(log.read_from(EventId::genesis()).is_empty());
    }

    #[test]
    fn transaction_ref_is_deterministic_and_block_scoped() {
        let a = transaction_ref(1, &actor(), "mint");
        let b = transaction_ref(1, &actor(), "mint");
        let c = transaction_ref(2, &actor(), "mint");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
