use std::collections::{HashMap, HashSet};

use tracing::info;

use scl_types::{AccountId, Role};

use crate::error::LedgerError;

/// Role assignments gating every mutating ledger operation.
///
/// Grant and revoke are themselves gated: only holders of [`Role::Admin`]
/// may change assignments, and `Admin` can re-delegate (and revoke)
/// itself, which is how control is handed over. The founding admin is
/// seeded exactly once through [`AccessRegistry::bootstrap`], since no
/// prior holder exists to grant it.
///
/// Assignments are never physically deleted, only toggled off; a revoked
/// role can be granted again later.
#[derive(Debug, Default)]
pub struct AccessRegistry {
    grants: HashMap<Role, HashSet<AccountId>>,
}

impl AccessRegistry {
    /// One-time initialization seeding the founding administrator.
    pub fn bootstrap(founder: AccountId) -> Self {
        let mut registry = Self::default();
        registry
            .grants
            .entry(Role::Admin)
            .or_default()
            .insert(founder);
        info!(founder = %founder, "access registry bootstrapped");
        registry
    }

    /// Pure read: does `account` currently hold `role`?
    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.grants
            .get(&role)
            .map(|holders| holders.contains(account))
            .unwrap_or(false)
    }

    /// Grant `role` to `account`. Requires `actor` to hold `Admin`.
    ///
    /// Returns whether the assignment actually changed; re-granting a
    /// held role is accepted but reports `false` so callers emit no
    /// spurious audit event.
    pub fn grant(
        &mut self,
        role: Role,
        account: AccountId,
        actor: &AccountId,
    ) -> Result<bool, LedgerError> {
        self.require(Role::Admin, actor)?;
        let changed = self.grants.entry(role).or_default().insert(account);
        if changed {
            info!(role = %role, account = %account, actor = %actor, "role granted");
        }
        Ok(changed)
    }

    /// Revoke `role` from `account`. Requires `actor` to hold `Admin`.
    /// Revoking `Admin` from oneself is allowed and takes effect
    /// immediately; there is no residual privilege afterwards.
    pub fn revoke(
        &mut self,
        role: Role,
        account: AccountId,
        actor: &AccountId,
    ) -> Result<bool, LedgerError> {
        self.require(Role::Admin, actor)?;
        let changed = self
            .grants
            .get_mut(&role)
            .map(|holders| holders.remove(&account))
            .unwrap_or(false);
        if changed {
            info!(role = %role, account = %account, actor = %actor, "role revoked");
        }
        Ok(changed)
    }

    /// Capability check for administrative operations.
    pub(crate) fn require(&self, role: Role, account: &AccountId) -> Result<(), LedgerError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized {
                role,
                account: *account,
            })
        }
    }

    /// Capability check for custody-transition participants.
    pub(crate) fn require_custody(
        &self,
        role: Role,
        account: &AccountId,
    ) -> Result<(), LedgerError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::InvalidRole { account: *account })
        }
    }
}
