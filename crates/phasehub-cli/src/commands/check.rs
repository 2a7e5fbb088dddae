//! Dry-run configuration check.

use phasehub_core::config::Settings;
use phasehub_core::error::AppError;
use phasehub_lifecycle::Lifecycle;

use crate::output;

/// Execute the check command
pub async fn execute(settings: &Settings) -> Result<(), AppError> {
    let registry = super::builtin_registry().await?;
    let owners = registry.owners().await;
    let lifecycle = Lifecycle::new(registry);

    match lifecycle.check(settings).await {
        Ok(()) => {
            output::print_success(&format!("Configuration valid for {} module(s)", owners.len()));
            for owner in owners {
                output::print_kv(owner.as_str(), "ok");
            }
            Ok(())
        }
        Err(e) => {
            output::print_kv(e.owner.as_str(), "failed");
            Err(e.into())
        }
    }
}
