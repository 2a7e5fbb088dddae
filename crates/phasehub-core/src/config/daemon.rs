//! Daemon process settings.

use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigSource};

/// Module name of the daemon's own section.
pub const DAEMON_SECTION: &str = "daemon";

/// Settings for the hosting process itself (not a lifecycle module).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Process name reported in logs.
    #[serde(default = "default_name")]
    pub name: String,
    /// Diagnostic tracing output.
    #[serde(default)]
    pub tracing: TracingConfig,
}

/// Diagnostic tracing configuration for the orchestrator's own events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    /// Filter directive: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl DaemonConfig {
    /// Reads the `[daemon]` section, falling back to defaults when absent.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        match source.section(DAEMON_SECTION) {
            Ok(section) => section.parse(),
            Err(ConfigError::MissingSection { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            tracing: TracingConfig::default(),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_name() -> String {
    "phasehub".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
