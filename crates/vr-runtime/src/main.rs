//! # Validity Runtime
//!
//! Starts the document service with its bus handlers and runs until Ctrl+C.
//!
//! Configuration comes from the environment; see
//! [`RuntimeConfig::from_env`](vr_runtime::RuntimeConfig::from_env).

use anyhow::{Context, Result};
use tracing::info;
use vr_runtime::{logging, RuntimeConfig, StorageBackend, ValidityRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging first, so configuration warnings are visible
    let subscriber = logging::subscriber(&logging::log_level_from_env(), std::io::stdout);
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")?;

    let config = RuntimeConfig::from_env();

    info!(
        max_documents = config.service.max_documents_per_user,
        max_notifications = config.service.max_notifications_per_document,
        timeout_ms = config.service.operation_timeout_ms,
        persistent = matches!(config.storage, StorageBackend::RocksDb { .. }),
        "[vr-runtime] Configuration loaded"
    );

    let runtime = ValidityRuntime::new(config).context("failed to build runtime")?;
    runtime.start();

    info!("[vr-runtime] Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    runtime.shutdown().await;

    Ok(())
}
