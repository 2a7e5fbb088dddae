//! Hook system: definitions, registry, and phase executor.

pub mod definitions;
pub mod executor;
pub mod registry;

pub use definitions::{FailurePolicy, HookError, HookRecord, ModuleId, Phase, Priority, RunContext};
pub use executor::{PhaseError, PhaseErrorKind, PhaseExecutor};
pub use registry::{HookRegistry, OrderingViolation};
