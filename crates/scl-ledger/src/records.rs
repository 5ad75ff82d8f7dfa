use std::fmt;

use serde::{Deserialize, Serialize};

use scl_types::{AccountId, BatchState, Role, Timestamp};

/// A product batch under custody tracking.
///
/// Ids are assigned sequentially from 1 and never reused. `quantity` is
/// fixed at mint time; the ledger does not split or merge batches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: u64,
    pub manufacturer: AccountId,
    pub metadata_uri: String,
    pub quantity: u64,
    /// True until the batch is recalled, then permanently false.
    pub active: bool,
    pub state: BatchState,
    /// Number of successful custody transfers; monotonically non-decreasing.
    pub custody_count: u64,
}

/// Immutable record of one custody hand-off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyTransfer {
    pub batch_id: u64,
    pub from: AccountId,
    pub to: AccountId,
    pub quantity: u64,
    pub timestamp: Timestamp,
    /// Position of the enclosing transaction in the ledger's total order.
    pub block: u64,
    pub tx_ref: [u8; 32],
}

/// Immutable record of a batch recall.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recall {
    pub batch_id: u64,
    pub timestamp: Timestamp,
    pub block: u64,
    pub tx_ref: [u8; 32],
}

/// Stable identity of an event in the log: ordering key plus position
/// within the transaction. Projections key idempotent upserts on this.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EventId {
    pub block: u64,
    pub log_index: u32,
}

impl EventId {
    pub const fn new(block: u64, log_index: u32) -> Self {
        Self { block, log_index }
    }

    /// The earliest possible position.
    pub const fn genesis() -> Self {
        Self {
            block: 0,
            log_index: 0,
        }
    }

    /// The immediate successor position (exclusive lower bound for reads).
    pub fn next(&self) -> Self {
        Self {
            block: self.block,
            log_index: self.log_index + 1,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}#{}", self.block, self.log_index)
    }
}

/// A domain event emitted by the ledger.
///
/// The log is the sole input to the projection indexer and the audit
/// trail for external observers; grant history must be reconstructible
/// from these events without trusting current registry state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    BatchMinted {
        batch_id: u64,
        manufacturer: AccountId,
        quantity: u64,
    },
    BatchTransferred {
        batch_id: u64,
        from: AccountId,
        to: AccountId,
        quantity: u64,
        timestamp: Timestamp,
    },
    BatchRecalled {
        batch_id: u64,
    },
    RoleGranted {
        role: Role,
        account: AccountId,
        actor: AccountId,
    },
    RoleRevoked {
        role: Role,
        account: AccountId,
        actor: AccountId,
    },
    Paused {
        actor: AccountId,
    },
    Unpaused {
        actor: AccountId,
    },
    SchemaMigrated {
        from_version: u32,
        to_version: u32,
        actor: AccountId,
    },
}

impl DomainEvent {
    /// Short name for logs and audit summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::BatchMinted { .. } => "BatchMinted",
            DomainEvent::BatchTransferred { .. } => "BatchTransferred",
            DomainEvent::BatchRecalled { .. } => "BatchRecalled",
            DomainEvent::RoleGranted { .. } => "RoleGranted",
            DomainEvent::RoleRevoked { .. } => "RoleRevoked",
            DomainEvent::Paused { .. } => "Paused",
            DomainEvent::Unpaused { .. } => "Unpaused",
            DomainEvent::SchemaMigrated { .. } => "SchemaMigrated",
        }
    }
}

/// One entry in the append-only event log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub tx_ref: [u8; 32],
    pub event: DomainEvent,
}

/// Result of `verify_authenticity`: the authoritative snapshot external
/// verifiers rely on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticityReport {
    pub manufacturer: AccountId,
    pub metadata_uri: String,
    pub active: bool,
    pub state: BatchState,
    pub custody_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_orders_block_first() {
        let a = EventId::new(1, 9);
        let b = EventId::new(2, 0);
        assert!(a < b);
    }

    #[test]
    fn event_id_orders_log_index_second() {
        let a = EventId::new(3, 0);
        let b = EventId::new(3, 1);
        assert!(a < b);
    }

    #[test]
    fn next_is_strictly_after() {
        let id = EventId::new(5, 2);
        assert!(id.next() > id);
        // The first position of the following block is still after next().
        assert!(EventId::new(6, 0) > id.next());
    }

    #[test]
    fn event_id_display() {
        assert_eq!(format!("{}", EventId::new(12, 3)), "b12#3");
    }

    #[test]
    fn event_kind_names() {
        let event = DomainEvent::BatchRecalled { batch_id: 7 };
        assert_eq!(event.kind(), "BatchRecalled");
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = EventRecord {
            id: EventId::new(4, 1),
            timestamp: Timestamp::from_millis(1_700_000_000_000),
            tx_ref: [0xab; 32],
            event: DomainEvent::BatchMinted {
                batch_id: 1,
                manufacturer: AccountId::from_raw([9; 32]),
                quantity: 100,
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
