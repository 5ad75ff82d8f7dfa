//! Projection indexer for the Supply Custody Ledger (SCL).
//!
//! Consumes the ledger's append-only event log and maintains three
//! read-optimized projections: batch status, ordered custody history,
//! and recall records. The indexer is an independent consumer with its
//! own persisted cursor: it may lag arbitrarily far behind the ledger,
//! tolerates at-least-once delivery (idempotent upsert keyed by event
//! identity), and supports explicit rebuild from genesis.
//!
//! Auxiliary reads back into the ledger (metadata, current state) are
//! treated as recoverable: a failed read degrades the projection rather
//! than blocking it. How a missing batch row is handled is configurable
//! via [`ConsistencyMode`].

pub mod cursor;
pub mod error;
pub mod indexer;
pub mod projection;

pub use cursor::IndexCursor;
pub use error::IndexerError;
pub use indexer::{ConsistencyMode, IndexerConfig, ProjectionIndexer};
pub use projection::{BatchProjection, CustodyRow, ProjectionStore, RecallRow};
