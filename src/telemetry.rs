//! Tracing subscriber setup.

use std::io;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Subscriber;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install the global fmt subscriber, logging to stderr.
///
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `config.level`. Only the first call installs anything; later calls
/// return `Ok(false)`.
pub fn init_tracing(config: &LogConfig) -> Result<bool, TelemetryError> {
    if INSTALLED.get().is_some() {
        return Ok(false);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|err| TelemetryError::Filter(err.to_string()))?,
    };

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_writer(io::stderr);

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.format {
        LogFormat::Full => Box::new(builder.finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INSTALLED.set(());
    Ok(true)
}
