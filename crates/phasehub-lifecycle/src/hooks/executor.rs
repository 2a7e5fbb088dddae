//! Phase executor. Runs every hook of a phase in order and threads the
//! shared context from one hook to the next.
//!
//! Failure handling follows the phase's [`FailurePolicy`]:
//! - `validate`, `start`, `reload`: the first failure stops the run; later
//!   hooks are never invoked.
//! - `stop`: every hook runs; the first failure is returned at the end.
//!
//! The executor never retries and never installs anything itself. Keeping
//! or discarding the returned context is the caller's decision.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use phasehub_core::config::{ConfigError, ConfigSource};
use phasehub_core::context::SharedContext;
use phasehub_core::error::{AppError, ErrorKind};

use super::definitions::{FailurePolicy, HookError, HookRecord, ModuleId, Phase, RunContext};
use super::registry::HookRegistry;

/// Why a hook failed.
#[derive(Debug, Error)]
pub enum PhaseErrorKind {
    /// The module's configuration section was missing or malformed.
    #[error("config read error: {0}")]
    ConfigRead(#[source] ConfigError),
    /// The callback itself failed.
    #[error("hook execution error: {0}")]
    HookExecution(#[source] HookError),
}

/// A failed phase run, attributed to the module whose hook failed.
#[derive(Debug, Error)]
#[error("{phase} hook of module '{owner}' failed: {kind}")]
pub struct PhaseError {
    /// Phase that was running.
    pub phase: Phase,
    /// Module whose hook failed.
    pub owner: ModuleId,
    /// Failure detail.
    #[source]
    pub kind: PhaseErrorKind,
}

impl PhaseError {
    /// Returns whether the process must not keep running after this error.
    pub fn is_fatal(&self) -> bool {
        self.phase.failure_policy() == FailurePolicy::Fatal
    }

    /// Returns whether the failure came from reading configuration.
    pub fn is_config_read(&self) -> bool {
        matches!(self.kind, PhaseErrorKind::ConfigRead(_))
    }
}

impl From<PhaseError> for AppError {
    fn from(err: PhaseError) -> Self {
        let kind = match &err.kind {
            PhaseErrorKind::ConfigRead(_) => ErrorKind::Configuration,
            PhaseErrorKind::HookExecution(_) => ErrorKind::Hook,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

/// Runs the hooks of one phase.
#[derive(Debug, Clone)]
pub struct PhaseExecutor {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl PhaseExecutor {
    /// Creates a new phase executor.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Runs every hook registered for `phase`, starting from `ctx`.
    ///
    /// Seals the registry. Each hook receives its owner's configuration
    /// section from `config` and the context returned by the hook before
    /// it. Returns the context produced by the last hook, or the first
    /// error together with the module that raised it.
    pub async fn run_phase(
        &self,
        phase: Phase,
        ctx: SharedContext,
        config: &dyn ConfigSource,
    ) -> Result<SharedContext, PhaseError> {
        self.registry.seal().await;

        let hooks = self.registry.hooks_for(phase).await;
        let run = RunContext::new(phase, hooks.len());
        let policy = phase.failure_policy();
        let started = Instant::now();

        info!(
            phase = %phase,
            run_id = %run.run_id,
            hook_count = hooks.len(),
            "Running lifecycle phase"
        );

        let mut current = ctx;
        let mut deferred: Option<PhaseError> = None;

        for (index, record) in hooks.iter().enumerate() {
            let run = run.at(index);

            match invoke(record, &run, config, &current).await {
                Ok(next) => {
                    debug!(
                        phase = %phase,
                        owner = %record.owner(),
                        priority = %record.priority(),
                        index = index,
                        "Hook completed"
                    );
                    current = next;
                }
                Err(kind) => {
                    let err = PhaseError {
                        phase,
                        owner: record.owner().clone(),
                        kind,
                    };

                    if policy == FailurePolicy::BestEffort {
                        warn!(
                            phase = %phase,
                            owner = %record.owner(),
                            error = %err.kind,
                            "Hook failed, continuing"
                        );
                        if deferred.is_none() {
                            deferred = Some(err);
                        }
                        continue;
                    }

                    error!(
                        phase = %phase,
                        owner = %record.owner(),
                        error = %err.kind,
                        skipped = hooks.len() - index - 1,
                        "Hook failed, aborting phase"
                    );
                    return Err(err);
                }
            }
        }

        if let Some(err) = deferred {
            return Err(err);
        }

        info!(
            phase = %phase,
            run_id = %run.run_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Lifecycle phase completed"
        );

        Ok(current)
    }
}

async fn invoke(
    record: &HookRecord,
    run: &RunContext,
    config: &dyn ConfigSource,
    ctx: &SharedContext,
) -> Result<SharedContext, PhaseErrorKind> {
    let section = config
        .section(record.owner().as_str())
        .map_err(PhaseErrorKind::ConfigRead)?;

    record
        .callback()
        .invoke(run, &section, ctx)
        .await
        .map_err(|e| match e {
            HookError::Config(e) => PhaseErrorKind::ConfigRead(e),
            other => PhaseErrorKind::HookExecution(other),
        })
}
