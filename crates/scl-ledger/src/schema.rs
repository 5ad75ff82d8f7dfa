//! Versioned storage schema.
//!
//! The ledger's storage layout must stay readable across logic
//! revisions: a migration may add fields or checks, but never
//! reinterprets or relocates existing batch and role records. Each
//! migration covers exactly one version step and runs under the same
//! Admin capability as `pause` and `recall`.

use crate::error::LedgerError;
use crate::ledger::LedgerState;

/// Version written at bootstrap.
pub const GENESIS_VERSION: u32 = 1;

/// Latest schema version this build understands.
pub const SCHEMA_VERSION: u32 = 2;

/// Apply the single migration step ending at `to`.
pub(crate) fn migrate_step(state: &mut LedgerState, to: u32) -> Result<(), LedgerError> {
    match to {
        2 => audit_custody_counts(state),
        other => Err(LedgerError::Migration {
            version: other,
            reason: "no migration registered for this version".into(),
        }),
    }
}

/// v1 → v2: storage audit pass. Recounts custody records against each
/// batch's counter before stamping the new version; a mismatch means
/// the storage predates an invariant this revision relies on, and the
/// migration refuses rather than patching silently.
fn audit_custody_counts(state: &mut LedgerState) -> Result<(), LedgerError> {
    for batch in state.batches.values() {
        let recorded = state
            .custody
            .iter()
            .filter(|t| t.batch_id == batch.id)
            .count() as u64;
        if recorded != batch.custody_count {
            return Err(LedgerError::Migration {
                version: 2,
                reason: format!(
                    "batch {} counts {} transfers but {} are recorded",
                    batch.id, batch.custody_count, recorded
                ),
            });
        }
    }
    Ok(())
}
