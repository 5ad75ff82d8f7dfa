use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use scl_types::{AccountId, BatchState, Role, Timestamp};

use crate::error::LedgerError;
use crate::log::{transaction_ref, EventLog};
use crate::records::{
    AuthenticityReport, Batch, CustodyTransfer, DomainEvent, EventId, EventRecord, Recall,
};
use crate::registry::AccessRegistry;
use crate::schema;
use crate::traits::{CustodyHook, EventFeed, LedgerQuery};

/// The custody ledger: batch records, role registry, and event log under
/// a single lock.
///
/// Each mutating operation takes the write guard, validates, mutates,
/// and appends events as one unit: the in-process equivalent of the
/// serialized, atomic transaction execution the surrounding environment
/// provides. Each successful mutating call occupies one block in the
/// log's total order.
pub struct BatchLedger {
    inner: RwLock<LedgerState>,
    hook: RwLock<Option<Arc<dyn CustodyHook>>>,
}

pub(crate) struct LedgerState {
    pub(crate) registry: AccessRegistry,
    pub(crate) batches: BTreeMap<u64, Batch>,
    pub(crate) custody: Vec<CustodyTransfer>,
    pub(crate) recalls: Vec<Recall>,
    pub(crate) log: EventLog,
    pub(crate) next_batch_id: u64,
    pub(crate) height: u64,
    pub(crate) paused: bool,
    pub(crate) schema_version: u32,
}

impl BatchLedger {
    /// Create a ledger with the founding administrator seeded.
    ///
    /// This is the explicit bootstrap step: the first admin has no prior
    /// grantor, so it is seeded here, once, and the founding grant is
    /// still recorded in the log so grant history stays reconstructible
    /// from events alone.
    pub fn bootstrap(founder: AccountId) -> Self {
        let mut log = EventLog::new();
        log.append(
            0,
            transaction_ref(0, &founder, "bootstrap"),
            Timestamp::now(),
            DomainEvent::RoleGranted {
                role: Role::Admin,
                account: founder,
                actor: founder,
            },
        );

        Self {
            inner: RwLock::new(LedgerState {
                registry: AccessRegistry::bootstrap(founder),
                batches: BTreeMap::new(),
                custody: Vec::new(),
                recalls: Vec::new(),
                log,
                next_batch_id: 1,
                height: 0,
                paused: false,
                schema_version: schema::GENESIS_VERSION,
            }),
            hook: RwLock::new(None),
        }
    }

    /// Register the external custody hand-off invoked after transfers.
    pub fn set_custody_hook(&self, hook: Arc<dyn CustodyHook>) -> Result<(), LedgerError> {
        *self.hook.write().map_err(|_| LedgerError::LockPoisoned)? = Some(hook);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Mutating operations
    // ---------------------------------------------------------------

    /// Mint a new batch. Manufacturer only; rejected while paused.
    /// Returns the newly assigned batch id.
    pub fn mint_batch(
        &self,
        actor: AccountId,
        metadata_uri: &str,
        quantity: u64,
    ) -> Result<u64, LedgerError> {
        let mut state = self.write_state()?;
        if state.paused {
            return Err(LedgerError::EnforcedPause);
        }
        state.registry.require(Role::Manufacturer, &actor)?;
        if metadata_uri.is_empty() {
            return Err(LedgerError::EmptyMetadataUri);
        }
        if quantity == 0 {
            return Err(LedgerError::ZeroQuantity);
        }

        let id = state.next_batch_id;
        let block = state.height + 1;
        let timestamp = Timestamp::now();

        state.batches.insert(
            id,
            Batch {
                id,
                manufacturer: actor,
                metadata_uri: metadata_uri.to_string(),
                quantity,
                active: true,
                state: BatchState::Created,
                custody_count: 0,
            },
        );
        state.next_batch_id += 1;
        state.height = block;
        state.log.append(
            block,
            transaction_ref(block, &actor, "mint"),
            timestamp,
            DomainEvent::BatchMinted {
                batch_id: id,
                manufacturer: actor,
                quantity,
            },
        );

        debug!(batch = id, manufacturer = %actor, quantity, "batch minted");
        Ok(id)
    }

    /// Hand custody of a batch to `to`, advancing the state machine.
    ///
    /// Authorization is state-dependent: CREATED needs a manufacturer
    /// caller and distributor recipient, DISTRIBUTED a distributor caller
    /// and retailer recipient, RETAIL a retailer caller and any
    /// recipient. SOLD admits no further transfer.
    ///
    /// The batch's state and custody count are committed, and the write
    /// guard released, strictly before the registered custody hook runs;
    /// no re-entrant call can observe the ledger mid-transition.
    pub fn transfer_batch(
        &self,
        actor: AccountId,
        id: u64,
        to: AccountId,
        quantity: u64,
    ) -> Result<(), LedgerError> {
        let transfer = {
            let mut guard = self.write_state()?;
            let state = &mut *guard;

            let batch = state
                .batches
                .get(&id)
                .ok_or(LedgerError::InvalidToken { id })?;
            if !batch.active {
                return Err(LedgerError::BatchInactive { id });
            }
            if state.paused {
                return Err(LedgerError::EnforcedPause);
            }
            if to.is_zero() {
                return Err(LedgerError::ZeroAddress);
            }
            if quantity == 0 {
                return Err(LedgerError::ZeroQuantity);
            }

            let next = match batch.state {
                BatchState::Created => {
                    state.registry.require_custody(Role::Manufacturer, &actor)?;
                    state.registry.require_custody(Role::Distributor, &to)?;
                    BatchState::Distributed
                }
                BatchState::Distributed => {
                    state.registry.require_custody(Role::Distributor, &actor)?;
                    state.registry.require_custody(Role::Retailer, &to)?;
                    BatchState::Retail
                }
                BatchState::Retail => {
                    state.registry.require_custody(Role::Retailer, &actor)?;
                    BatchState::Sold
                }
                BatchState::Sold => {
                    return Err(LedgerError::InvalidRole { account: actor });
                }
                // Unreachable while the active flag is enforced above,
                // but CLOSED must never admit a transfer regardless.
                BatchState::Closed => {
                    return Err(LedgerError::BatchInactive { id });
                }
            };

            let block = state.height + 1;
            let timestamp = Timestamp::now();
            let tx_ref = transaction_ref(block, &actor, "transfer");
            let record = CustodyTransfer {
                batch_id: id,
                from: actor,
                to,
                quantity,
                timestamp,
                block,
                tx_ref,
            };

            let batch = state
                .batches
                .get_mut(&id)
                .ok_or(LedgerError::InvalidToken { id })?;
            batch.state = next;
            batch.custody_count += 1;

            state.custody.push(record.clone());
            state.height = block;
            state.log.append(
                block,
                tx_ref,
                timestamp,
                DomainEvent::BatchTransferred {
                    batch_id: id,
                    from: actor,
                    to,
                    quantity,
                    timestamp,
                },
            );

            debug!(batch = id, from = %actor, to = %to, state = %next, "custody transferred");
            record
        };

        // External hand-off, after the guard is dropped.
        if let Some(hook) = self.custody_hook()? {
            hook.on_custody_transfer(&transfer);
        }
        Ok(())
    }

    /// Permanently deactivate a batch. Admin only.
    ///
    /// Recall stays available while the ledger is paused: the emergency
    /// stop must work even when routine operations are frozen.
    pub fn recall_batch(&self, actor: AccountId, id: u64) -> Result<(), LedgerError> {
        let mut guard = self.write_state()?;
        let state = &mut *guard;
        state.registry.require(Role::Admin, &actor)?;

        let batch = state
            .batches
            .get_mut(&id)
            .ok_or(LedgerError::InvalidToken { id })?;
        if !batch.active {
            return Err(LedgerError::AlreadyInactive { id });
        }

        batch.active = false;
        batch.state = BatchState::Closed;

        let block = state.height + 1;
        let timestamp = Timestamp::now();
        let tx_ref = transaction_ref(block, &actor, "recall");
        state.recalls.push(Recall {
            batch_id: id,
            timestamp,
            block,
            tx_ref,
        });
        state.height = block;
        state.log.append(
            block,
            tx_ref,
            timestamp,
            DomainEvent::BatchRecalled { batch_id: id },
        );

        info!(batch = id, actor = %actor, "batch recalled");
        Ok(())
    }

    /// Freeze routine mutating operations. Admin only.
    pub fn pause(&self, actor: AccountId) -> Result<(), LedgerError> {
        let mut state = self.write_state()?;
        state.registry.require(Role::Admin, &actor)?;
        if state.paused {
            return Err(LedgerError::EnforcedPause);
        }
        state.paused = true;
        let block = state.height + 1;
        state.height = block;
        state.log.append(
            block,
            transaction_ref(block, &actor, "pause"),
            Timestamp::now(),
            DomainEvent::Paused { actor },
        );
        warn!(actor = %actor, "ledger paused");
        Ok(())
    }

    /// Resume routine mutating operations. Admin only.
    pub fn unpause(&self, actor: AccountId) -> Result<(), LedgerError> {
        let mut state = self.write_state()?;
        state.registry.require(Role::Admin, &actor)?;
        if !state.paused {
            return Err(LedgerError::ExpectedPause);
        }
        state.paused = false;
        let block = state.height + 1;
        state.height = block;
        state.log.append(
            block,
            transaction_ref(block, &actor, "unpause"),
            Timestamp::now(),
            DomainEvent::Unpaused { actor },
        );
        info!(actor = %actor, "ledger unpaused");
        Ok(())
    }

    /// Grant `role` to `account`. Admin only; a no-op re-grant succeeds
    /// but emits no event.
    pub fn grant_role(
        &self,
        actor: AccountId,
        role: Role,
        account: AccountId,
    ) -> Result<(), LedgerError> {
        let mut state = self.write_state()?;
        let changed = state.registry.grant(role, account, &actor)?;
        if changed {
            let block = state.height + 1;
            state.height = block;
            state.log.append(
                block,
                transaction_ref(block, &actor, "grant-role"),
                Timestamp::now(),
                DomainEvent::RoleGranted {
                    role,
                    account,
                    actor,
                },
            );
        }
        Ok(())
    }

    /// Revoke `role` from `account`. Admin only; revocation takes effect
    /// immediately and completely, including for the actor itself.
    pub fn revoke_role(
        &self,
        actor: AccountId,
        role: Role,
        account: AccountId,
    ) -> Result<(), LedgerError> {
        let mut state = self.write_state()?;
        let changed = state.registry.revoke(role, account, &actor)?;
        if changed {
            let block = state.height + 1;
            state.height = block;
            state.log.append(
                block,
                transaction_ref(block, &actor, "revoke-role"),
                Timestamp::now(),
                DomainEvent::RoleRevoked {
                    role,
                    account,
                    actor,
                },
            );
        }
        Ok(())
    }

    /// Advance the storage schema to the current version. Admin only.
    ///
    /// Migrations run one version step at a time and never reinterpret
    /// or relocate existing batch/role storage; historical records stay
    /// readable across revisions. Already-current storage is left
    /// untouched. Returns the version in effect afterwards.
    pub fn migrate_schema(&self, actor: AccountId) -> Result<u32, LedgerError> {
        let mut guard = self.write_state()?;
        let state = &mut *guard;
        state.registry.require(Role::Admin, &actor)?;

        let from = state.schema_version;
        while state.schema_version < schema::SCHEMA_VERSION {
            let to = state.schema_version + 1;
            schema::migrate_step(state, to)?;
            state.schema_version = to;
        }

        if state.schema_version != from {
            let block = state.height + 1;
            state.height = block;
            state.log.append(
                block,
                transaction_ref(block, &actor, "migrate"),
                Timestamp::now(),
                DomainEvent::SchemaMigrated {
                    from_version: from,
                    to_version: state.schema_version,
                    actor,
                },
            );
            info!(from, to = state.schema_version, actor = %actor, "schema migrated");
        }
        Ok(state.schema_version)
    }

    // ---------------------------------------------------------------
    // Read queries
    // ---------------------------------------------------------------

    /// The authoritative verification snapshot for a batch.
    pub fn verify_authenticity(&self, id: u64) -> Result<AuthenticityReport, LedgerError> {
        let state = self.read_state()?;
        let batch = state
            .batches
            .get(&id)
            .ok_or(LedgerError::InvalidToken { id })?;
        Ok(AuthenticityReport {
            manufacturer: batch.manufacturer,
            metadata_uri: batch.metadata_uri.clone(),
            active: batch.active,
            state: batch.state,
            custody_count: batch.custody_count,
        })
    }

    pub fn batch_state(&self, id: u64) -> Result<BatchState, LedgerError> {
        let state = self.read_state()?;
        state
            .batches
            .get(&id)
            .map(|b| b.state)
            .ok_or(LedgerError::InvalidToken { id })
    }

    /// Full batch record, cloned out of storage.
    pub fn batch(&self, id: u64) -> Result<Batch, LedgerError> {
        let state = self.read_state()?;
        state
            .batches
            .get(&id)
            .cloned()
            .ok_or(LedgerError::InvalidToken { id })
    }

    pub fn batch_count(&self) -> Result<u64, LedgerError> {
        Ok(self.read_state()?.batches.len() as u64)
    }

    /// Ledger-side custody records for a batch, in transfer order.
    pub fn custody_of(&self, id: u64) -> Result<Vec<CustodyTransfer>, LedgerError> {
        let state = self.read_state()?;
        if !state.batches.contains_key(&id) {
            return Err(LedgerError::InvalidToken { id });
        }
        Ok(state
            .custody
            .iter()
            .filter(|t| t.batch_id == id)
            .cloned()
            .collect())
    }

    /// The recall record for a batch, if it has been recalled.
    pub fn recall_of(&self, id: u64) -> Result<Option<Recall>, LedgerError> {
        let state = self.read_state()?;
        if !state.batches.contains_key(&id) {
            return Err(LedgerError::InvalidToken { id });
        }
        Ok(state.recalls.iter().find(|r| r.batch_id == id).cloned())
    }

    pub fn has_role(&self, role: Role, account: &AccountId) -> Result<bool, LedgerError> {
        Ok(self.read_state()?.registry.has_role(role, account))
    }

    pub fn paused(&self) -> Result<bool, LedgerError> {
        Ok(self.read_state()?.paused)
    }

    /// The visible storage schema version marker.
    pub fn schema_version(&self) -> Result<u32, LedgerError> {
        Ok(self.read_state()?.schema_version)
    }

    /// Number of transactions executed so far.
    pub fn height(&self) -> Result<u64, LedgerError> {
        Ok(self.read_state()?.height)
    }

    // ---------------------------------------------------------------
    // Guard helpers
    // ---------------------------------------------------------------

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    fn custody_hook(&self) -> Result<Option<Arc<dyn CustodyHook>>, LedgerError> {
        Ok(self
            .hook
            .read()
            .map_err(|_| LedgerError::LockPoisoned)?
            .clone())
    }
}

impl LedgerQuery for BatchLedger {
    fn verify_authenticity(&self, id: u64) -> Result<AuthenticityReport, LedgerError> {
        BatchLedger::verify_authenticity(self, id)
    }

    fn batch_state(&self, id: u64) -> Result<BatchState, LedgerError> {
        BatchLedger::batch_state(self, id)
    }
}

impl EventFeed for BatchLedger {
    fn events_from(&self, from: EventId) -> Result<Vec<EventRecord>, LedgerError> {
        Ok(self.read_state()?.log.read_from(from))
    }

    fn head(&self) -> Result<Option<EventId>, LedgerError> {
        Ok(self.read_state()?.log.head())
    }
}
