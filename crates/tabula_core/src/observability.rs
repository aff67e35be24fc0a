//! Tracing subscriber initialization.

use tabula_error::ConfigError;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// The filter is read from `RUST_LOG` and falls back to `info`. With `json`
/// set, events are written as one JSON object per line, which is what log
/// shippers expect; otherwise the human-readable format is used.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| ConfigError::invalid("tracing", e.to_string()))?;
    tracing::debug!(json, "Tracing initialized");
    Ok(())
}
