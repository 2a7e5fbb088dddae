//! Logging module (`sys.log`).
//!
//! Registered at `PreSystem` priority so the logger it builds is visible to
//! every hook that runs after it, in the same phase and in later ones.
//! Validate only parses the section; start and reload build a fresh
//! [`JsonLogger`] and publish it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use phasehub_core::config::{ConfigError, ConfigSection};
use phasehub_core::context::SharedContext;
use phasehub_core::log::{Level, LogRecord, Logger};
use phasehub_lifecycle::hook_records;
use phasehub_lifecycle::{Hook, HookError, HookRecord, RunContext};

/// Module name, also the configuration section name.
pub const MODULE_NAME: &str = "sys.log";

/// Logging module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Optional file receiving a copy of every record.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Minimum level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Whether records are written to stdout.
    #[serde(default = "default_true")]
    pub stdout: bool,
    /// Fields merged into every record.
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogConfig {
    /// Parses the configured level.
    pub fn level(&self) -> Result<Level, ConfigError> {
        self.level.parse().map_err(|e| ConfigError::Malformed {
            module: MODULE_NAME.to_string(),
            reason: format!("{e}"),
        })
    }

    /// Builds the logger described by this configuration.
    ///
    /// Opens the log file in append mode when one is configured.
    pub fn build_logger(&self) -> Result<JsonLogger, HookError> {
        let level = self.level()?;
        let mut sinks: Vec<Box<dyn Write + Send>> = Vec::new();

        if self.stdout {
            sinks.push(Box::new(std::io::stdout()));
        }

        if let Some(path) = &self.file {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    HookError::with_source(
                        format!("cannot create log directory '{}'", parent.display()),
                        e,
                    )
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    HookError::with_source(format!("cannot open log file '{}'", path.display()), e)
                })?;
            sinks.push(Box::new(file));
        }

        Ok(JsonLogger::new(level, self.fields.clone(), sinks))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_level(),
            stdout: default_true(),
            fields: serde_json::Map::new(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

/// Logger writing one JSON object per line to each of its sinks.
pub struct JsonLogger {
    level: Level,
    fields: serde_json::Map<String, serde_json::Value>,
    sinks: Vec<Mutex<Box<dyn Write + Send>>>,
}

impl JsonLogger {
    /// Creates a logger writing records at or above `level` to `sinks`.
    pub fn new(
        level: Level,
        fields: serde_json::Map<String, serde_json::Value>,
        sinks: Vec<Box<dyn Write + Send>>,
    ) -> Self {
        Self {
            level,
            fields,
            sinks: sinks.into_iter().map(Mutex::new).collect(),
        }
    }

    /// Returns the minimum level written.
    pub fn level(&self) -> Level {
        self.level
    }

    fn render(&self, record: &LogRecord) -> String {
        let mut line = serde_json::Map::new();
        for (key, value) in self.fields.iter().chain(record.fields.iter()) {
            line.insert(key.clone(), value.clone());
        }
        // Reserved keys always describe the record itself.
        line.insert("ts".to_string(), record.timestamp.to_rfc3339().into());
        line.insert("level".to_string(), record.level.as_str().into());
        line.insert("msg".to_string(), record.message.clone().into());
        serde_json::Value::Object(line).to_string()
    }
}

impl std::fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLogger")
            .field("level", &self.level)
            .field("fields", &self.fields)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Logger for JsonLogger {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    fn log(&self, record: &LogRecord) {
        if !self.enabled(record.level) {
            return;
        }
        let line = self.render(record);
        for sink in &self.sinks {
            let mut writer = sink.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = writeln!(writer, "{line}") {
                tracing::warn!(error = %e, "Failed to write log record");
            }
        }
    }
}

/// The logging module's hook.
#[derive(Debug, Default)]
pub struct LoggingModule;

#[async_trait]
impl Hook for LoggingModule {
    async fn invoke(
        &self,
        run: &RunContext,
        config: &ConfigSection,
        ctx: &SharedContext,
    ) -> Result<SharedContext, HookError> {
        let cfg: LogConfig = config.parse()?;
        let level = cfg.level()?;

        if run.is_dry_run() {
            return Ok(ctx.clone());
        }

        let logger: Arc<dyn Logger> = Arc::new(cfg.build_logger()?);
        logger.info(
            "logger installed",
            &[
                ("module", MODULE_NAME.into()),
                ("phase", run.phase.as_str().into()),
                ("level", level.as_str().into()),
            ],
        );

        Ok(ctx.with_logger(logger))
    }
}

/// Returns the logging module's hook table.
pub fn hooks() -> Vec<HookRecord> {
    let module = Arc::new(LoggingModule);
    hook_records![MODULE_NAME;
        Validate @ PreSystem => module.clone(),
        Start @ PreSystem => module.clone(),
        Reload @ PreSystem => module,
    ]
}
