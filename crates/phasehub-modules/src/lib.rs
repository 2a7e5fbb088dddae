//! # phasehub-modules
//!
//! Built-in lifecycle modules:
//!
//! - [`logging`] (`sys.log`): builds the JSON logger and installs it into
//!   the shared context ahead of every other module.
//! - [`database`] (`sys.db`): validates connection pool settings and
//!   publishes them as a [`database::DatabaseHandle`] capability.

pub mod database;
pub mod logging;

use phasehub_lifecycle::{HookRegistry, OrderingViolation};

/// Registers every built-in module's hooks.
///
/// Fails when the registry was already sealed by a phase run.
pub async fn register_builtin(registry: &HookRegistry) -> Result<(), OrderingViolation> {
    registry.try_register(logging::hooks()).await?;
    registry.try_register(database::hooks()).await
}
