//! # Runtime Configuration
//!
//! Service quotas, storage backend selection, bus sizing and log level.
//!
//! All values have defaults; environment variables override them. An
//! unparsable override is ignored with a warning rather than aborting
//! startup.

use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;
use vr_document_service::ServiceConfig;

/// Default data directory for persistent storage.
pub const DEFAULT_DATA_DIR: &str = "./data/validity";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where documents and notifications are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; lost on exit.
    Memory,
    /// RocksDB database at `path` (requires the `rocksdb` feature).
    RocksDb { path: PathBuf },
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Quotas and deadline for the document service.
    pub service: ServiceConfig,
    /// Storage backend.
    pub storage: StorageBackend,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// `EnvFilter` directive for logging.
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            storage: StorageBackend::Memory,
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Service quotas or deadline rejected.
    #[error("invalid service configuration: {0}")]
    Service(#[from] vr_document_service::ConfigError),

    /// The bus needs room for at least one event.
    #[error("bus capacity must be greater than zero")]
    ZeroBusCapacity,

    /// RocksDB selected but the binary was built without it.
    #[error("RocksDB storage requested but the `rocksdb` feature is disabled")]
    RocksDbUnavailable,
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `VR_MAX_DOCUMENTS` | `service.max_documents_per_user` |
    /// | `VR_MAX_NOTIFICATIONS` | `service.max_notifications_per_document` |
    /// | `VR_TIMEOUT_MS` | `service.operation_timeout_ms` |
    /// | `VR_STORAGE` | `memory` or `rocksdb` |
    /// | `VR_DATA_DIR` | RocksDB path |
    /// | `VR_BUS_CAPACITY` | `bus_capacity` |
    /// | `VR_LOG_LEVEL` / `RUST_LOG` | `log_level` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(limit) = parse_var(&lookup, "VR_MAX_DOCUMENTS") {
            config.service.max_documents_per_user = limit;
        }
        if let Some(limit) = parse_var(&lookup, "VR_MAX_NOTIFICATIONS") {
            config.service.max_notifications_per_document = limit;
        }
        if let Some(timeout) = parse_var(&lookup, "VR_TIMEOUT_MS") {
            config.service.operation_timeout_ms = timeout;
        }
        if let Some(capacity) = parse_var(&lookup, "VR_BUS_CAPACITY") {
            config.bus_capacity = capacity;
        }

        let data_dir = lookup("VR_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        if let Some(storage) = lookup("VR_STORAGE") {
            match storage.trim().to_ascii_lowercase().as_str() {
                "memory" => config.storage = StorageBackend::Memory,
                "rocksdb" => {
                    config.storage = StorageBackend::RocksDb {
                        path: PathBuf::from(data_dir),
                    }
                }
                other => warn!("[vr-runtime] Unknown VR_STORAGE {:?}, using memory", other),
            }
        }

        config.log_level = crate::logging::log_level(&lookup);
        config
    }

    /// Reject configurations the runtime cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.service.validate()?;
        if self.bus_capacity == 0 {
            return Err(ConfigError::ZeroBusCapacity);
        }
        if matches!(self.storage, StorageBackend::RocksDb { .. }) && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::RocksDbUnavailable);
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("[vr-runtime] Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
