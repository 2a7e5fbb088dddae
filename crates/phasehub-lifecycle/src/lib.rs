//! # phasehub-lifecycle
//!
//! Phased module lifecycle for PhaseHub. Provides:
//!
//! - Hook records tagged with owner, phase, and priority tier
//! - A registry that seals itself when the first phase runs
//! - A phase executor that threads the shared context through hooks in
//!   `(priority, registration order)` order with per-phase failure policy
//! - A lifecycle driver exposing the check/start/reload/stop triggers

pub mod hooks;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod traits;

pub use hooks::definitions::{
    FailurePolicy, HookError, HookRecord, ModuleId, Phase, Priority, RunContext,
};
pub use hooks::executor::{PhaseError, PhaseErrorKind, PhaseExecutor};
pub use hooks::registry::{HookRegistry, OrderingViolation};
pub use manager::Lifecycle;
pub use traits::{FnHook, Hook};
