//! Hook listing in execution order.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use phasehub_core::error::AppError;
use phasehub_lifecycle::{HookRegistry, Phase};

use crate::output::{self, OutputFormat};

/// Arguments for the hooks command
#[derive(Debug, Args)]
pub struct HooksArgs {
    /// Only list hooks of this phase (validate, start, reload, stop)
    #[arg(short, long)]
    pub phase: Option<Phase>,
}

/// One row of the hook listing
#[derive(Debug, Serialize, Tabled)]
pub struct HookRow {
    /// Phase the hook runs in
    pub phase: String,
    /// Position within the phase
    pub order: usize,
    /// Owning module
    pub owner: String,
    /// Priority tier
    pub priority: String,
}

/// Execute the hooks command
pub async fn execute(args: &HooksArgs, format: OutputFormat) -> Result<(), AppError> {
    let registry = super::builtin_registry().await?;
    let rows = collect_rows(&registry, args.phase).await;
    output::print_list(&rows, format);
    Ok(())
}

/// Build rows for `phase`, or for every phase in driving order
pub async fn collect_rows(registry: &HookRegistry, phase: Option<Phase>) -> Vec<HookRow> {
    let phases = match phase {
        Some(phase) => vec![phase],
        None => Phase::ALL.to_vec(),
    };

    let mut rows = Vec::new();
    for phase in phases {
        for (order, record) in registry.hooks_for(phase).await.iter().enumerate() {
            rows.push(HookRow {
                phase: phase.to_string(),
                order: order + 1,
                owner: record.owner().to_string(),
                priority: record.priority().to_string(),
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rows_follow_execution_order() {
        let registry = super::super::builtin_registry()
            .await
            .expect("builtin registry");
        let rows = collect_rows(&registry, Some(Phase::Start)).await;

        let owners: Vec<&str> = rows.iter().map(|r| r.owner.as_str()).collect();
        assert_eq!(owners, vec!["sys.log", "sys.db"]);
        assert_eq!(rows[0].order, 1);
        assert_eq!(rows[0].priority, "pre_system");
    }

    #[tokio::test]
    async fn test_rows_for_all_phases() {
        let registry = super::super::builtin_registry()
            .await
            .expect("builtin registry");
        let rows = collect_rows(&registry, None).await;

        assert_eq!(rows.first().map(|r| r.phase.as_str()), Some("validate"));
        assert_eq!(rows.last().map(|r| r.phase.as_str()), Some("stop"));
        assert!(!registry.is_sealed());
    }
}
