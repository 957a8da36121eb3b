//! # Logging
//!
//! Builds the `tracing` subscriber. The binary installs it before loading
//! the rest of the configuration, so warnings about ignored overrides are
//! not lost.

use crate::container::config::DEFAULT_LOG_LEVEL;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Log filter from `VR_LOG_LEVEL`, then `RUST_LOG`, then the default.
pub fn log_level(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("VR_LOG_LEVEL")
        .or_else(|| lookup("RUST_LOG"))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Log filter from the process environment.
pub fn log_level_from_env() -> String {
    log_level(|key| std::env::var(key).ok())
}

/// Formatting subscriber for `level`, writing to `writer`.
///
/// An unparsable filter falls back to the default level.
pub fn subscriber<W>(level: &str, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .finish()
}
