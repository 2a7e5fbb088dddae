//! CLI command definitions and dispatch.

pub mod check;
pub mod config;
pub mod hooks;
pub mod tab;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use phasehub_core::config::Settings;
use phasehub_core::error::AppError;
use phasehub_lifecycle::HookRegistry;

/// PhaseHub: phased module lifecycle tooling
#[derive(Debug, Parser)]
#[command(name = "phasehub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded next to the configuration file
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the validate phase of every module (dry run)
    Check,
    /// List registered hooks in execution order
    Hooks(hooks::HooksArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
    /// Align whitespace-separated columns read from stdin
    Tab,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Check => check::execute(&self.load_settings()?).await,
            Commands::Hooks(args) => hooks::execute(args, self.format).await,
            Commands::Config(args) => config::execute(args, &self.load_settings()?, self.format),
            Commands::Tab => tab::execute(),
        }
    }

    /// Helper: load configuration from file, overlay, and environment
    fn load_settings(&self) -> Result<Settings, AppError> {
        tracing::debug!(config = %self.config, env = ?self.env, "Loading settings");
        Settings::load(&self.config, self.env.as_deref()).map_err(AppError::from)
    }
}

/// Helper: registry populated with the built-in modules
pub async fn builtin_registry() -> Result<Arc<HookRegistry>, AppError> {
    let registry = Arc::new(HookRegistry::new());
    phasehub_modules::register_builtin(&registry).await?;
    Ok(registry)
}
