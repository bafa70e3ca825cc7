pub mod config;

pub use config::{
    CacheSettings, Config, ConfigValidationError, LoggingConfig, ServerConfig, UpstreamConfig,
    ValidationResult,
};

use anyhow::Result;

/// Initialize tracing with the given default filter.
///
/// `RUST_LOG` takes precedence over `default_filter` when set.
pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Folio logging initialized");
    Ok(())
}
