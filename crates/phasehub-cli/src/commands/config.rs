//! Configuration inspection commands.

use clap::{Args, Subcommand};

use phasehub_core::config::{ConfigSource, Settings};
use phasehub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the configuration section of a module
    Show {
        /// Module name (e.g. sys.log)
        module: String,
    },
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show { module } => {
            let section = settings.section(module)?;
            output::print_value(section.value(), format);
        }
    }

    Ok(())
}
