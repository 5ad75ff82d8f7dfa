//! Custody ledger for the Supply Custody Ledger (SCL).
//!
//! This crate is the authoritative half of SCL. It provides:
//! - Role registry with an explicit one-time bootstrap seed
//! - The batch custody state machine: mint, transfer, recall, pause
//! - An append-only domain event log, the sole input to the indexer
//! - Versioned storage schema with admin-gated migration
//! - `LedgerQuery` / `EventFeed` / `CustodyHook` trait boundaries
//!
//! Every mutating operation runs as one atomic unit under the ledger's
//! write lock: it validates, mutates, and appends events, or fails with
//! no partial state change and nothing emitted.

pub mod error;
pub mod ledger;
pub mod log;
pub mod records;
pub mod registry;
pub mod schema;
pub mod traits;

pub use error::LedgerError;
pub use ledger::BatchLedger;
pub use log::EventLog;
pub use records::{
    AuthenticityReport, Batch, CustodyTransfer, DomainEvent, EventId, EventRecord, Recall,
};
pub use registry::AccessRegistry;
pub use schema::SCHEMA_VERSION;
pub use traits::{CustodyHook, EventFeed, LedgerQuery};
