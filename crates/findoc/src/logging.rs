//! Process-wide tracing setup.
//!
//! `log` records (emitted by the database layer and some dependencies) are
//! bridged into `tracing` so one subscriber sees everything.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LogFormat;

/// Installs the global subscriber. Filtering follows `RUST_LOG`, falling back
/// to `info`. Calling this twice is an error reported as `Err`, not a panic.
pub fn init(format: LogFormat) -> Result<(), String> {
    tracing_log::LogTracer::init().map_err(|e| e.to_string())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = Registry::default().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true))
            .try_init()
            .map_err(|e| e.to_string()),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .map_err(|e| e.to_string()),
    }
}
