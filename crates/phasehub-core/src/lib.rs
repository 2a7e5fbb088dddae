//! # phasehub-core
//!
//! Core crate for PhaseHub. Contains the configuration source contract,
//! the shared context carried between lifecycle hooks, the logger
//! capability, and the unified error system.
//!
//! This crate has **no** internal dependencies on other PhaseHub crates.

pub mod config;
pub mod context;
pub mod error;
pub mod log;
pub mod result;

pub use config::{ConfigError, ConfigSection, ConfigSource, Settings};
pub use context::{Capability, CapabilitySet, SharedContext};
pub use error::AppError;
pub use log::{Level, LogRecord, Logger};
pub use result::AppResult;
