//! Lifecycle driver. Owns the current shared context and exposes the
//! phase triggers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use phasehub_core::config::ConfigSource;
use phasehub_core::context::SharedContext;

use crate::hooks::definitions::Phase;
use crate::hooks::executor::{PhaseError, PhaseExecutor};
use crate::hooks::registry::HookRegistry;

/// Drives the phases of all registered modules.
///
/// At most one phase runs at a time. The current context is replaced as a
/// whole, and only when a phase that is allowed to apply changes succeeds.
#[derive(Debug)]
pub struct Lifecycle {
    /// Phase executor over the hook registry.
    executor: PhaseExecutor,
    /// Context installed by the last successful start or reload.
    current: ArcSwap<SharedContext>,
    /// Serializes phase runs.
    gate: Mutex<()>,
    /// Set after a successful start.
    started: AtomicBool,
}

impl Lifecycle {
    /// Creates a driver starting from an empty context.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self::with_context(registry, SharedContext::new())
    }

    /// Creates a driver starting from `initial`.
    pub fn with_context(registry: Arc<HookRegistry>, initial: SharedContext) -> Self {
        Self {
            executor: PhaseExecutor::new(registry),
            current: ArcSwap::from_pointee(initial),
            gate: Mutex::new(()),
            started: AtomicBool::new(false),
        }
    }

    /// Returns the currently installed context.
    pub fn context(&self) -> SharedContext {
        self.current.load_full().as_ref().clone()
    }

    /// Returns whether start completed successfully.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Runs the validate phase as a dry run.
    ///
    /// Whatever context the hooks produce is discarded.
    pub async fn check(&self, config: &dyn ConfigSource) -> Result<(), PhaseError> {
        let _gate = self.gate.lock().await;
        self.executor
            .run_phase(Phase::Validate, self.context(), config)
            .await
            .map(|_discarded| ())
    }

    /// Runs the start phase and installs its context.
    ///
    /// An error is fatal: the caller must not keep the process running.
    pub async fn start(&self, config: &dyn ConfigSource) -> Result<SharedContext, PhaseError> {
        let _gate = self.gate.lock().await;
        let next = self
            .executor
            .run_phase(Phase::Start, self.context(), config)
            .await?;

        self.current.store(Arc::new(next.clone()));
        self.started.store(true, Ordering::Release);
        info!(capabilities = ?next.get().names(), "Lifecycle started");
        Ok(next)
    }

    /// Runs the reload phase.
    ///
    /// On success the new context replaces the current one. On failure the
    /// current context is kept untouched and the error is returned.
    pub async fn reload(&self, config: &dyn ConfigSource) -> Result<SharedContext, PhaseError> {
        let _gate = self.gate.lock().await;
        let previous = self.current.load_full();

        match self
            .executor
            .run_phase(Phase::Reload, previous.as_ref().clone(), config)
            .await
        {
            Ok(next) => {
                self.current.store(Arc::new(next.clone()));
                info!(capabilities = ?next.get().names(), "Lifecycle reloaded");
                Ok(next)
            }
            Err(e) => {
                warn!(
                    owner = %e.owner,
                    error = %e,
                    "Reload failed, keeping previous context"
                );
                Err(e)
            }
        }
    }

    /// Runs the stop phase. Every stop hook runs even if some fail.
    pub async fn stop(&self, config: &dyn ConfigSource) -> Result<(), PhaseError> {
        let _gate = self.gate.lock().await;
        let result = self
            .executor
            .run_phase(Phase::Stop, self.context(), config)
            .await;
        self.started.store(false, Ordering::Release);
        result.map(|_| ())
    }

    /// Runs `phase` through its dedicated trigger.
    pub async fn trigger(
        &self,
        phase: Phase,
        config: &dyn ConfigSource,
    ) -> Result<(), PhaseError> {
        match phase {
            Phase::Validate => self.check(config).await,
            Phase::Start => self.start(config).await.map(|_| ()),
            Phase::Reload => self.reload(config).await.map(|_| ()),
            Phase::Stop => self.stop(config).await,
        }
    }
}
