//! Convenience re-exports for module authors.

pub use async_trait::async_trait;

pub use phasehub_core::config::{ConfigError, ConfigSection, ConfigSource};
pub use phasehub_core::context::SharedContext;
pub use phasehub_core::log::{Level, Logger};

pub use crate::hook_records;
pub use crate::hooks::definitions::{HookError, HookRecord, ModuleId, Phase, Priority, RunContext};
pub use crate::hooks::registry::HookRegistry;
pub use crate::traits::{FnHook, Hook};
