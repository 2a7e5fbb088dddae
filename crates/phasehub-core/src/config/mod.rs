//! Configuration sources and named module sections.
//!
//! Every module owns one named section of the merged configuration tree.
//! Dotted module names (`sys.log`) address nested TOML tables, so
//! `[sys.log]` in a file is the section of the `sys.log` module.

pub mod daemon;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use self::daemon::{DaemonConfig, TracingConfig};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PHASEHUB";

/// Errors raised while loading or reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The module has no section in the configuration tree.
    #[error("configuration section '{module}' not found")]
    MissingSection {
        /// Module whose section was requested.
        module: String,
    },
    /// The section exists but could not be parsed into the requested type.
    #[error("configuration section '{module}' is malformed: {reason}")]
    Malformed {
        /// Module whose section failed to parse.
        module: String,
        /// Parser or validator message.
        reason: String,
    },
    /// The configuration tree itself could not be built.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// A named, read-only configuration blob owned by a [`ConfigSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSection {
    module: String,
    value: serde_json::Value,
}

impl ConfigSection {
    /// Creates a section for `module` from a raw value.
    pub fn new(module: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            module: module.into(),
            value,
        }
    }

    /// Returns the owning module name.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the raw section value.
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Deserializes the section into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        serde_json::from_value(self.value.clone()).map_err(|e| ConfigError::Malformed {
            module: self.module.clone(),
            reason: e.to_string(),
        })
    }

    /// Deserializes the section into a caller-supplied destination.
    ///
    /// `out` is left untouched when parsing fails.
    pub fn read<T: DeserializeOwned>(&self, out: &mut T) -> Result<(), ConfigError> {
        *out = self.parse()?;
        Ok(())
    }
}

/// Supplies per-module configuration sections.
pub trait ConfigSource: Send + Sync {
    /// Returns the section owned by `module`.
    fn section(&self, module: &str) -> Result<ConfigSection, ConfigError>;

    /// Reads the section owned by `module` into `out`.
    fn read<T: DeserializeOwned>(&self, module: &str, out: &mut T) -> Result<(), ConfigError>
    where
        Self: Sized,
    {
        self.section(module)?.read(out)
    }
}

/// File and environment backed configuration tree.
///
/// Layers, lowest precedence first: the base file, an optional
/// environment overlay file, then `PHASEHUB__*` environment variables
/// (`PHASEHUB__SYS__LOG__LEVEL=debug` sets `sys.log.level`).
#[derive(Debug, Clone)]
pub struct Settings {
    inner: config::Config,
}

impl Settings {
    /// Loads the base file at `path` plus an optional overlay for `env`.
    ///
    /// The overlay lives next to the base file and is named after the
    /// environment (`config/production.toml`). Missing files are skipped.
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            let overlay = std::path::Path::new(path)
                .with_file_name(env)
                .to_string_lossy()
                .into_owned();
            builder = builder.add_source(config::File::with_name(&overlay).required(false));
        }

        let inner = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        tracing::debug!(path = %path, env = ?env, "Configuration loaded");

        Ok(Self { inner })
    }

    /// Builds settings from an in-memory TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let inner = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Returns an empty configuration tree.
    pub fn empty() -> Self {
        Self {
            inner: config::Config::default(),
        }
    }
}

impl ConfigSource for Settings {
    fn section(&self, module: &str) -> Result<ConfigSection, ConfigError> {
        match self.inner.get::<serde_json::Value>(module) {
            Ok(value) => Ok(ConfigSection::new(module, value)),
            Err(config::ConfigError::NotFound(_)) => Err(ConfigError::MissingSection {
                module: module.to_string(),
            }),
            Err(e) => Err(ConfigError::Malformed {
                module: module.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
