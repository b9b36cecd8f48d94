//! Observability utilities.
//!
//! Stage services log through `tracing` with structured fields
//! (`instance_id`, `stage`, `run_handle`, ...). Binaries embedding pcstage
//! call [`init_tracing`] once to install a subscriber.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::errors::{PcStageError, Result};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Builds the event filter from `RUST_LOG`, falling back to `default_filter`.
pub fn env_filter(default_filter: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|err| PcStageError::Configuration(format!("invalid log filter: {err}")))
}

/// Installs the global tracing subscriber.
///
/// Fails if the filter is invalid or a subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = env_filter(DEFAULT_LOG_FILTER)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| PcStageError::Configuration(format!("tracing init failed: {err}")))
}
