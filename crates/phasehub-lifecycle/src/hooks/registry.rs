//! Hook registry. Modules register hooks during bootstrap; the registry
//! seals itself when the first phase runs.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use phasehub_core::error::AppError;

use super::definitions::{HookRecord, ModuleId, Phase};

/// Registration attempted after a phase started running.
///
/// This is a breach of the bootstrap contract, not a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hook registration for {owners:?} after the registry was sealed")]
pub struct OrderingViolation {
    /// Owners of the rejected records.
    pub owners: Vec<ModuleId>,
}

impl From<OrderingViolation> for AppError {
    fn from(err: OrderingViolation) -> Self {
        AppError::ordering(err.to_string())
    }
}

/// Append-only table of hook records.
///
/// Records are kept in registration order; [`HookRegistry::hooks_for`]
/// orders them by priority tier with registration order as the tie-break.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// Records in registration order.
    records: RwLock<Vec<HookRecord>>,
    /// Set once the first phase starts.
    sealed: AtomicBool,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module's hook records.
    ///
    /// # Panics
    ///
    /// Panics when called after the registry has been sealed.
    pub async fn register(&self, records: Vec<HookRecord>) {
        if let Err(violation) = self.try_register(records).await {
            panic!("{violation}");
        }
    }

    /// Registers a module's hook records, or reports an
    /// [`OrderingViolation`] if the registry is sealed.
    pub async fn try_register(&self, records: Vec<HookRecord>) -> Result<(), OrderingViolation> {
        let mut table = self.records.write().await;

        if self.sealed.load(Ordering::Acquire) {
            return Err(OrderingViolation {
                owners: records.iter().map(|r| r.owner().clone()).collect(),
            });
        }

        for record in records {
            info!(
                owner = %record.owner(),
                phase = %record.phase(),
                priority = %record.priority(),
                "Hook registered"
            );
            table.push(record);
        }

        Ok(())
    }

    /// Closes the registry for further registration.
    pub async fn seal(&self) {
        // Taken under the write lock so no registration is in flight.
        let _table = self.records.write().await;
        if !self.sealed.swap(true, Ordering::AcqRel) {
            debug!("Hook registry sealed");
        }
    }

    /// Returns whether the registry has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Returns the hooks registered for `phase` in execution order.
    pub async fn hooks_for(&self, phase: Phase) -> Vec<HookRecord> {
        let table = self.records.read().await;
        let mut hooks: Vec<HookRecord> = table
            .iter()
            .filter(|r| r.phase() == phase)
            .cloned()
            .collect();
        // Stable sort: equal tiers keep registration order.
        hooks.sort_by_key(|r| r.priority());
        hooks
    }

    /// Returns every record in registration order.
    pub async fn all(&self) -> Vec<HookRecord> {
        self.records.read().await.clone()
    }

    /// Returns the distinct owners in first-registration order.
    pub async fn owners(&self) -> Vec<ModuleId> {
        let table = self.records.read().await;
        let mut owners: Vec<ModuleId> = Vec::new();
        for record in table.iter() {
            if !owners.contains(record.owner()) {
                owners.push(record.owner().clone());
            }
        }
        owners
    }

    /// Returns the number of registered records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns whether no records are registered.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
