use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use scl_ledger::EventId;
use scl_types::{AccountId, BatchState, Timestamp};

/// Denormalized view of one batch, maintained by replaying events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProjection {
    pub batch_id: u64,
    pub manufacturer: AccountId,
    pub quantity: u64,
    /// Canonical URI read back from the ledger at mint time; empty if
    /// that read failed (degraded but available).
    pub metadata_uri: String,
    pub active: bool,
    pub state: BatchState,
    pub custody_count: u64,
    pub minted_at: Timestamp,
    pub minted_in: EventId,
}

/// Immutable custody-history row, the shape external viewers consume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRow {
    pub event: EventId,
    pub batch_id: u64,
    pub from: AccountId,
    pub to: AccountId,
    pub quantity: u64,
    pub timestamp: Timestamp,
    pub tx_ref: [u8; 32],
}

/// Immutable recall row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallRow {
    pub event: EventId,
    pub batch_id: u64,
    pub timestamp: Timestamp,
    pub tx_ref: [u8; 32],
}

/// The three projections, keyed for idempotent upserts.
///
/// Custody and recall rows are keyed by their [`EventId`], so applying
/// the same event twice overwrites a row with itself instead of
/// duplicating it, and iteration order is the log's total order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProjectionStore {
    batches: BTreeMap<u64, BatchProjection>,
    custody: BTreeMap<EventId, CustodyRow>,
    recalls: BTreeMap<EventId, RecallRow>,
}

impl ProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batch(&self, batch_id: u64) -> Option<&BatchProjection> {
        self.batches.get(&batch_id)
    }

    pub fn batch_mut(&mut self, batch_id: u64) -> Option<&mut BatchProjection> {
        self.batches.get_mut(&batch_id)
    }

    pub fn upsert_batch(&mut self, row: BatchProjection) {
        self.batches.insert(row.batch_id, row);
    }

    pub fn upsert_custody(&mut self, row: CustodyRow) {
        self.custody.insert(row.event, row);
    }

    pub fn upsert_recall(&mut self, row: RecallRow) {
        self.recalls.insert(row.event, row);
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn custody_count(&self) -> usize {
        self.custody.len()
    }

    /// Ordered custody history for one batch, ascending by event id.
    pub fn custody_history(&self, batch_id: u64) -> Vec<&CustodyRow> {
        self.custody
            .values()
            .filter(|row| row.batch_id == batch_id)
            .collect()
    }

    /// Recall rows for one batch (at most one in a consistent log).
    pub fn recalls_of(&self, batch_id: u64) -> Vec<&RecallRow> {
        self.recalls
            .values()
            .filter(|row| row.batch_id == batch_id)
            .collect()
    }

    /// Drop every projection row (rebuild support).
    pub fn clear(&mut self) {
        self.batches.clear();
        self.custody.clear();
        self.recalls.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(seed: u8) -> AccountId {
        AccountId::from_raw([seed; 32])
    }

    fn custody_row(block: u64, batch_id: u64) -> CustodyRow {
        CustodyRow {
            event: EventId::new(block, 0),
            batch_id,
            from: account(1),
            to: account(2),
            quantity: 10,
            timestamp: Timestamp::from_millis(block * 1000),
            tx_ref: [block as u8; 32],
        }
    }

    #[test]
    fn custody_history_is_ordered_and_filtered() {
        let mut store = ProjectionStore::new();
        store.upsert_custody(custody_row(3, 1));
        store.upsert_custody(custody_row(1, 1));
        store.upsert_custody(custody_row(2, 2));

        let history = store.custody_history(1);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].event, EventId::new(1, 0));
        assert_eq!(history[1].event, EventId::new(3, 0));
    }

    #[test]
    fn upsert_custody_is_idempotent_per_event() {
        let mut store = ProjectionStore::new();
        store.upsert_custody(custody_row(1, 1));
        store.upsert_custody(custody_row(1, 1));
        assert_eq!(store.custody_count(), 1);
    }

    #[test]
    fn clear_empties_every_projection() {
        let mut store = ProjectionStore::new();
        store.upsert_custody(custody_row(1, 1));
        store.upsert_recall(RecallRow {
            event: EventId::new(2, 0),
            batch_id: 1,
            timestamp: Timestamp::zero(),
            tx_ref: [0; 32],
        });
        store.clear();
        assert_eq!(store.custody_count(), 0);
        assert_eq!(store.batch_count(), 0);
        assert!(store.recalls_of(1).is_empty());
    }
}
