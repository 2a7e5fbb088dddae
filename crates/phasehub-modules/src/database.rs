//! Database module (`sys.db`).
//!
//! Owns the connection pool settings of the relational store. The store
//! itself is an external collaborator; this module validates the settings
//! and publishes them as a [`DatabaseHandle`] capability so that modules
//! running later can open connections with them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use phasehub_core::config::{ConfigError, ConfigSection};
use phasehub_core::context::SharedContext;
use phasehub_core::log::Level;
use phasehub_lifecycle::hook_records;
use phasehub_lifecycle::{Hook, HookError, HookRecord, Phase, RunContext};

/// Module name, also the configuration section name.
pub const MODULE_NAME: &str = "sys.db";

/// Drivers the pool settings can target.
pub const SUPPORTED_DRIVERS: [&str; 3] = ["sqlite3", "mysql", "postgres"];

/// Connection pool configuration.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Driver name, one of [`SUPPORTED_DRIVERS`].
    #[validate(custom(function = "validate_driver"))]
    pub driver: String,
    /// Data source name (connection URL or file path).
    #[validate(length(min = 1))]
    pub dsn: String,
    /// Maximum number of open connections.
    #[serde(default = "default_max_open_conns")]
    #[validate(range(min = 1, max = 1000))]
    pub max_open_conns: u32,
    /// Maximum number of idle connections.
    #[serde(default = "default_max_idle_conns")]
    #[validate(range(max = 1000))]
    pub max_idle_conns: u32,
    /// Maximum lifetime of a connection in seconds. Zero means unlimited.
    #[serde(default)]
    pub conn_max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Parses and validates a section.
    pub fn from_section(section: &ConfigSection) -> Result<Self, ConfigError> {
        let config: Self = section.parse()?;
        config.validate().map_err(|e| ConfigError::Malformed {
            module: section.module().to_string(),
            reason: e.to_string(),
        })?;
        if config.max_idle_conns > config.max_open_conns {
            return Err(ConfigError::Malformed {
                module: section.module().to_string(),
                reason: format!(
                    "max_idle_conns ({}) exceeds max_open_conns ({})",
                    config.max_idle_conns, config.max_open_conns
                ),
            });
        }
        Ok(config)
    }
}

fn validate_driver(driver: &str) -> Result<(), ValidationError> {
    if SUPPORTED_DRIVERS.contains(&driver) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_driver"))
    }
}

fn default_max_open_conns() -> u32 {
    10
}

fn default_max_idle_conns() -> u32 {
    2
}

/// Pool settings published into the shared context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseHandle {
    /// Driver name.
    pub driver: String,
    /// Data source name with the password masked.
    pub dsn: String,
    /// Maximum number of open connections.
    pub max_open_conns: u32,
    /// Maximum number of idle connections.
    pub max_idle_conns: u32,
    /// Maximum connection lifetime, if bounded.
    pub conn_max_lifetime: Option<Duration>,
}

impl From<&DatabaseConfig> for DatabaseHandle {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            driver: config.driver.clone(),
            dsn: mask_password(&config.dsn),
            max_open_conns: config.max_open_conns,
            max_idle_conns: config.max_idle_conns,
            conn_max_lifetime: (config.conn_max_lifetime_secs > 0)
                .then(|| Duration::from_secs(config.conn_max_lifetime_secs)),
        }
    }
}

/// Mask the password in a connection URL for display.
///
/// Only the authority part (between `://` and the next `/`, `?` or `#`)
/// is searched for credentials, and the last `@` in it ends the userinfo.
pub fn mask_password(url: &str) -> String {
    let authority_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let authority_len = url[authority_start..]
        .find(['/', '?', '#'])
        .unwrap_or(url.len() - authority_start);
    let authority = &url[authority_start..authority_start + authority_len];

    let Some(at_pos) = authority.rfind('@') else {
        return url.to_string();
    };
    let Some(colon_pos) = authority[..at_pos].find(':') else {
        return url.to_string();
    };

    let mut masked = url[..authority_start + colon_pos + 1].to_string();
    masked.push_str("****");
    masked.push_str(&url[authority_start + at_pos..]);
    masked
}

/// The database module's hook.
#[derive(Debug, Default)]
pub struct DatabaseModule;

#[async_trait]
impl Hook for DatabaseModule {
    async fn invoke(
        &self,
        run: &RunContext,
        config: &ConfigSection,
        ctx: &SharedContext,
    ) -> Result<SharedContext, HookError> {
        if run.phase == Phase::Stop {
            if let Some(handle) = ctx.extension::<DatabaseHandle>() {
                ctx.log(
                    Level::Info,
                    "database pool released",
                    &[("module", MODULE_NAME.into()), ("dsn", handle.dsn.clone().into())],
                );
            }
            return Ok(ctx.clone());
        }

        let cfg = DatabaseConfig::from_section(config)?;
        if run.is_dry_run() {
            return Ok(ctx.clone());
        }

        let handle = DatabaseHandle::from(&cfg);
        ctx.log(
            Level::Info,
            "database pool configured",
            &[
                ("module", MODULE_NAME.into()),
                ("phase", run.phase.as_str().into()),
                ("driver", handle.driver.clone().into()),
                ("dsn", handle.dsn.clone().into()),
                ("max_open_conns", handle.max_open_conns.into()),
            ],
        );

        Ok(ctx.with_extension(handle))
    }
}

/// Returns the database module's hook table.
pub fn hooks() -> Vec<HookRecord> {
    let module = Arc::new(DatabaseModule);
    hook_records![MODULE_NAME;
        Validate @ System => module.clone(),
        Start @ System => module.clone(),
        Reload @ System => module.clone(),
        Stop @ System => module,
    ]
}
