use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use scl_ledger::{DomainEvent, EventFeed, EventId, EventRecord, LedgerQuery};
use scl_types::{AccountId, BatchState, Timestamp};

use crate::cursor::IndexCursor;
use crate::error::{IndexerError, IndexerResult};
use crate::projection::{BatchProjection, CustodyRow, ProjectionStore, RecallRow};

/// How the indexer treats a transfer/recall event whose batch projection
/// row does not exist yet (out-of-order or missing mint event).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsistencyMode {
    /// Refuse the event and halt consumption at it, leaving the cursor
    /// in place so the operator can backfill and resume.
    Strict,
    /// Log, keep the immutable row, drop the batch-row update, and
    /// continue, degraded but available.
    #[default]
    Lenient,
}

/// Indexer configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct IndexerConfig {
    pub mode: ConsistencyMode,
}

/// Consumes domain events in log order and maintains the read model.
///
/// Applies are idempotent per [`EventId`], so at-least-once delivery
/// never double-counts a transfer. The ledger handle is only used for
/// auxiliary reads (canonical metadata, current state); failures there
/// degrade the projection instead of failing the event.
pub struct ProjectionIndexer<L: LedgerQuery> {
    ledger: Arc<L>,
    config: IndexerConfig,
    store: ProjectionStore,
    cursor: IndexCursor,
    applied: HashSet<EventId>,
}

impl<L: LedgerQuery> ProjectionIndexer<L> {
    pub fn new(ledger: Arc<L>, config: IndexerConfig) -> Self {
        Self {
            ledger,
            config,
            store: ProjectionStore::new(),
            cursor: IndexCursor::genesis(),
            applied: HashSet::new(),
        }
    }

    /// Drain every event past the cursor from the feed.
    ///
    /// Returns the number of newly applied events. In strict mode a
    /// missing batch row aborts the drain with the cursor still pointing
    /// at the failing event; syncing again after backfill resumes there.
    pub fn sync<F: EventFeed>(&mut self, feed: &F) -> IndexerResult<u64> {
        let records = feed
            .events_from(self.cursor.position())
            .map_err(|e| IndexerError::Feed(e.to_string()))?;

        let mut applied = 0;
        for record in &records {
            if self.apply(record)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Clear the read model and replay the feed from genesis.
    pub fn rebuild<F: EventFeed>(&mut self, feed: &F) -> IndexerResult<u64> {
        self.store.clear();
        self.applied.clear();
        self.cursor = IndexCursor::genesis();
        self.sync(feed)
    }

    /// Apply a single event. Returns `false` for an already-applied
    /// duplicate (re-delivery), `true` when the event was applied.
    pub fn apply(&mut self, record: &EventRecord) -> IndexerResult<bool> {
        if self.applied.contains(&record.id) {
            debug!(event = %record.id, kind = record.event.kind(), "duplicate delivery skipped");
            self.cursor.advance_past(record.id);
            return Ok(false);
        }

        match &record.event {
            DomainEvent::BatchMinted {
                batch_id,
                manufacturer,
                quantity,
            } => self.apply_mint(record, *batch_id, *manufacturer, *quantity),
            DomainEvent::BatchTransferred {
                batch_id,
                from,
                to,
                quantity,
                timestamp,
            } => self.apply_transfer(record, *batch_id, *from, *to, *quantity, *timestamp)?,
            DomainEvent::BatchRecalled { batch_id } => self.apply_recall(record, *batch_id)?,
            other => {
                // Role, pause, and migration events are audit-only; they
                // advance the cursor without projecting.
                debug!(event = %record.id, kind = other.kind(), "non-projected event");
            }
        }

        self.applied.insert(record.id);
        self.cursor.advance_past(record.id);
        Ok(true)
    }

    fn apply_mint(
        &mut self,
        record: &EventRecord,
        batch_id: u64,
        manufacturer: AccountId,
        quantity: u64,
    ) {
        // The mint event does not carry the URI; read it back from the
        // ledger, and accept a degraded (empty) value over a blocked
        // projection if that read fails.
        let metadata_uri = match self.ledger.verify_authenticity(batch_id) {
            Ok(report) => report.metadata_uri,
            Err(err) => {
                warn!(batch = batch_id, error = %err, "metadata read failed; projecting empty URI");
                String::new()
            }
        };

        self.store.upsert_batch(BatchProjection {
            batch_id,
            manufacturer,
            quantity,
            metadata_uri,
            active: true,
            state: BatchState::Created,
            custody_count: 0,
            minted_at: record.timestamp,
            minted_in: record.id,
        });
        debug!(batch = batch_id, event = %record.id, "batch projected");
    }

    fn apply_transfer(
        &mut self,
        record: &EventRecord,
        batch_id: u64,
        from: AccountId,
        to: AccountId,
        quantity: u64,
        timestamp: Timestamp,
    ) -> IndexerResult<()> {
        if self.config.mode == ConsistencyMode::Strict && self.store.batch(batch_id).is_none() {
            return Err(IndexerError::MissingBatchRow {
                batch_id,
                event: record.id,
            });
        }

        self.store.upsert_custody(CustodyRow {
            event: record.id,
            batch_id,
            from,
            to,
            quantity,
            timestamp,
            tx_ref: record.tx_ref,
        });

        match self.store.batch_mut(batch_id) {
            None => {
                warn!(
                    batch = batch_id,
                    event = %record.id,
                    "transfer for unknown batch row; update dropped"
                );
            }
            Some(row) => {
                row.custody_count += 1;
                // Refresh from the authoritative state rather than
                // inferring the transition locally.
                match self.ledger.batch_state(batch_id) {
                    Ok(state) => row.state = state,
                    Err(err) => {
                        warn!(batch = batch_id, error = %err, "state refresh failed; keeping projected state");
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_recall(&mut self, record: &EventRecord, batch_id: u64) -> IndexerResult<()> {
        if self.config.mode == ConsistencyMode::Strict && self.store.batch(batch_id).is_none() {
            return Err(IndexerError::MissingBatchRow {
                batch_id,
                event: record.id,
            });
        }

        self.store.upsert_recall(RecallRow {
            event: record.id,
            batch_id,
            timestamp: record.timestamp,
            tx_ref: record.tx_ref,
        });

        match self.store.batch_mut(batch_id) {
            None => {
                warn!(
                    batch = batch_id,
                    event = %record.id,
                    "recall for unknown batch row; update dropped"
                );
            }
            Some(row) => {
                row.active = false;
                row.state = BatchState::Closed;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Query surface
    // ---------------------------------------------------------------

    pub fn store(&self) -> &ProjectionStore {
        &self.store
    }

    pub fn cursor(&self) -> IndexCursor {
        self.cursor
    }

    /// Ordered custody history for one batch, ascending by event id,
    /// the shape verification UIs consume.
    pub fn custody_history(&self, batch_id: u64) -> Vec<&CustodyRow> {
        self.store.custody_history(batch_id)
    }

    pub fn batch(&self, batch_id: u64) -> Option<&BatchProjection> {
        self.store.batch(batch_id)
    }
}
