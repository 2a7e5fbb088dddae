//! PhaseHub daemon
//!
//! Registers the built-in modules, validates and starts them, then waits for
//! signals: SIGHUP reloads the configuration, Ctrl-C or SIGTERM stops every
//! module.

use std::sync::Arc;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::{EnvFilter, fmt};

use phasehub_core::config::{DaemonConfig, Settings};
use phasehub_core::error::AppError;
use phasehub_lifecycle::{HookRegistry, Lifecycle};

#[tokio::main]
async fn main() {
    let settings = match load_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let daemon = match DaemonConfig::from_source(&settings) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Invalid daemon configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&daemon);

    if let Err(e) = run(daemon, settings).await {
        tracing::error!("Daemon error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay, and variables
fn load_settings() -> Result<Settings, AppError> {
    let config_path =
        std::env::var("PHASEHUB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("PHASEHUB_ENV").ok();

    Settings::load(&config_path, env.as_deref()).map_err(AppError::from)
}

/// Initialize tracing for the orchestrator's own events
fn init_logging(daemon: &DaemonConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&daemon.tracing.level));

    match daemon.tracing.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main daemon run function
async fn run(daemon: DaemonConfig, mut settings: Settings) -> Result<(), AppError> {
    tracing::info!("Starting {} v{}", daemon.name, env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(HookRegistry::new());
    phasehub_modules::register_builtin(&registry).await?;
    tracing::info!(
        modules = ?registry.owners().await,
        hooks = registry.len().await,
        "Modules registered"
    );

    let lifecycle = Lifecycle::new(registry);

    lifecycle.check(&settings).await?;
    tracing::info!("Configuration check passed");

    lifecycle.start(&settings).await?;
    tracing::info!("{} started", daemon.name);

    #[cfg(unix)]
    let mut hangup = signal(SignalKind::hangup()).map_err(AppError::from)?;
    #[cfg(unix)]
    let mut terminate = signal(SignalKind::terminate()).map_err(AppError::from)?;

    loop {
        #[cfg(unix)]
        let (reload_requested, terminated) = (hangup.recv(), terminate.recv());
        #[cfg(not(unix))]
        let (reload_requested, terminated) = (
            std::future::pending::<Option<()>>(),
            std::future::pending::<Option<()>>(),
        );

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(AppError::from)?;
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = terminated => {
                tracing::info!("Termination signal received");
                break;
            }
            _ = reload_requested => {
                tracing::info!("Reload signal received");
                match reload(&lifecycle).await {
                    Ok(next) => settings = next,
                    Err(e) => tracing::error!("Reload rejected, keeping previous configuration: {}", e),
                }
            }
        }
    }

    lifecycle.stop(&settings).await?;
    tracing::info!("{} stopped", daemon.name);
    Ok(())
}

/// Re-read the configuration, check it, and reload every module.
///
/// The caller keeps its previous settings when this fails.
async fn reload(lifecycle: &Lifecycle) -> Result<Settings, AppError> {
    let settings = load_settings()?;
    lifecycle.check(&settings).await?;
    lifecycle.reload(&settings).await?;
    Ok(settings)
}
