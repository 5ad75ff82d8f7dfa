use scl_types::{AccountId, Role};

/// Errors produced by ledger operations.
///
/// Every mutating call is all-or-nothing: any of these aborts the whole
/// operation with no state change and no event emitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("metadata URI must not be empty")]
    EmptyMetadataUri,

    #[error("quantity must be positive")]
    ZeroQuantity,

    #[error("transfer recipient is the zero account")]
    ZeroAddress,

    #[error("account {account} lacks the capability required for this custody step")]
    InvalidRole { account: AccountId },

    #[error("batch {id} has been recalled and is inactive")]
    BatchInactive { id: u64 },

    #[error("batch {id} is already inactive")]
    AlreadyInactive { id: u64 },

    #[error("unknown batch id {id}")]
    InvalidToken { id: u64 },

    #[error("operation rejected while the ledger is paused")]
    EnforcedPause,

    #[error("the ledger is not paused")]
    ExpectedPause,

    #[error("account {account} does not hold the {role} role")]
    Unauthorized { role: Role, account: AccountId },

    #[error("schema migration to v{version} failed: {reason}")]
    Migration { version: u32, reason: String },

    #[error("ledger lock poisoned")]
    LockPoisoned,
}
