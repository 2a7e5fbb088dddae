//! Phase, priority, and hook record definitions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use phasehub_core::config::ConfigError;

use crate::traits::Hook;

/// Lifecycle phases a hook can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Parse and type-check configuration only. No side effects.
    Validate,
    /// Bring the module up at process bootstrap.
    Start,
    /// Re-apply configuration at runtime.
    Reload,
    /// Release resources at shutdown.
    Stop,
}

/// What the executor does when a hook fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure.
    FailFast,
    /// Stop at the first failure; the process must not keep running.
    Fatal,
    /// Stop at the first failure; the caller keeps its previous context.
    KeepPrevious,
    /// Run every hook and report the first failure afterwards.
    BestEffort,
}

impl Phase {
    /// All phases in their natural driving order.
    pub const ALL: [Phase; 4] = [Phase::Validate, Phase::Start, Phase::Reload, Phase::Stop];

    /// Returns the string name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Start => "start",
            Self::Reload => "reload",
            Self::Stop => "stop",
        }
    }

    /// Returns the failure policy applied to this phase.
    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            Self::Validate => FailurePolicy::FailFast,
            Self::Start => FailurePolicy::Fatal,
            Self::Reload => FailurePolicy::KeepPrevious,
            Self::Stop => FailurePolicy::BestEffort,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "validate" | "test" | "check" => Ok(Self::Validate),
            "start" => Ok(Self::Start),
            "reload" => Ok(Self::Reload),
            "stop" => Ok(Self::Stop),
            other => Err(format!("unknown phase '{other}'")),
        }
    }
}

/// Coarse ordering bucket within a phase. Lower tiers run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Before the system's own bootstrap (logging).
    PreSystem,
    /// The system's own services.
    System,
    /// Regular modules.
    Module,
    /// After everything else.
    PostSystem,
}

impl Priority {
    /// Returns the string name of this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreSystem => "pre_system",
            Self::System => "system",
            Self::Module => "module",
            Self::PostSystem => "post_system",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of the module owning a hook. Also the name of its
/// configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates a module identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Immutable registration unit.
#[derive(Clone)]
pub struct HookRecord {
    owner: ModuleId,
    phase: Phase,
    priority: Priority,
    callback: Arc<dyn Hook>,
}

impl HookRecord {
    /// Creates a hook record.
    pub fn new(
        owner: impl Into<ModuleId>,
        phase: Phase,
        priority: Priority,
        callback: Arc<dyn Hook>,
    ) -> Self {
        Self {
            owner: owner.into(),
            phase,
            priority,
            callback,
        }
    }

    /// Returns the owning module.
    pub fn owner(&self) -> &ModuleId {
        &self.owner
    }

    /// Returns the phase this hook runs in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the priority tier.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the callback.
    pub fn callback(&self) -> &Arc<dyn Hook> {
        &self.callback
    }
}

impl fmt::Debug for HookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRecord")
            .field("owner", &self.owner)
            .field("phase", &self.phase)
            .field("priority", &self.priority)
            .field("callback", &self.callback)
            .finish()
    }
}

/// Per-run information handed to every hook of one phase run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunContext {
    /// Identifier shared by all hooks of this run.
    pub run_id: Uuid,
    /// Phase being run.
    pub phase: Phase,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Position of the current hook in the ordered sequence.
    pub index: usize,
    /// Number of hooks in the run.
    pub total: usize,
}

impl RunContext {
    /// Creates the context for a new run of `phase` over `total` hooks.
    pub fn new(phase: Phase, total: usize) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            phase,
            started_at: Utc::now(),
            index: 0,
            total,
        }
    }

    /// Returns a copy positioned at hook `index`.
    pub fn at(&self, index: usize) -> Self {
        Self {
            index,
            ..self.clone()
        }
    }

    /// Returns whether this is a dry run that must not apply anything.
    pub fn is_dry_run(&self) -> bool {
        self.phase == Phase::Validate
    }
}

/// Error returned by a hook callback.
#[derive(Debug, Error)]
pub enum HookError {
    /// The hook could not parse or validate its configuration section.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The hook itself failed.
    #[error("{message}")]
    Failed {
        /// What went wrong.
        message: String,
        /// Optional underlying cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl HookError {
    /// Creates a failure without an underlying cause.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a failure wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
