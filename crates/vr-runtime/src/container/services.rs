//! # Service Wiring
//!
//! Builds the service graph for the selected storage backend.
//!
//! ```text
//! store ──► DocumentService ─────┐
//!   │                            ├──► DocumentServiceHandler ──► event bus
//!   └────► NotificationService ──┘
//! ```

use crate::container::config::{ConfigError, RuntimeConfig, StorageBackend};
use shared_bus::{EventPublisher, InMemoryEventBus};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use vr_document_service::{
    DocumentApi, DocumentRepository, DocumentService, DocumentServiceHandler, InMemoryStore,
    NotificationApi, NotificationRepository, NotificationService, StoreError, SystemTimeSource,
    TimeSource,
};

/// Handler over type-erased services, as held by the runtime.
pub type DocumentHandler = DocumentServiceHandler<dyn DocumentApi, dyn NotificationApi>;

/// Container construction failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage backend could not be opened.
    #[error("failed to open storage: {0}")]
    Storage(#[from] StoreError),
}

/// Every long-lived component of the runtime.
pub struct ServiceContainer {
    /// Active configuration.
    pub config: RuntimeConfig,
    /// Shared event bus.
    pub event_bus: Arc<InMemoryEventBus>,
    /// Document API.
    pub documents: Arc<dyn DocumentApi>,
    /// Notification API.
    pub notifications: Arc<dyn NotificationApi>,
    /// Deadline-enforcing request handler.
    pub handler: Arc<DocumentHandler>,
}

impl ServiceContainer {
    /// Validate `config` and open the configured storage backend.
    pub fn new(config: RuntimeConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        match &config.storage {
            StorageBackend::Memory => {
                info!("[vr-runtime] Using in-memory storage");
                Ok(Self::with_store(config, Arc::new(InMemoryStore::new())))
            }
            #[cfg(feature = "rocksdb")]
            StorageBackend::RocksDb { path } => {
                use crate::adapters::storage::{RocksDbConfig, RocksDbDocumentStore};

                info!("[vr-runtime] Opening RocksDB at {}", path.display());
                let store = RocksDbDocumentStore::open(RocksDbConfig {
                    path: path.to_string_lossy().to_string(),
                    ..RocksDbConfig::default()
                })?;
                Ok(Self::with_store(config, Arc::new(store)))
            }
            #[cfg(not(feature = "rocksdb"))]
            StorageBackend::RocksDb { .. } => Err(ConfigError::RocksDbUnavailable.into()),
        }
    }

    /// Wire the services over an already-open store and the system clock.
    pub fn with_store<S>(config: RuntimeConfig, store: Arc<S>) -> Self
    where
        S: DocumentRepository + NotificationRepository + 'static,
    {
        Self::with_store_and_clock(config, store, Arc::new(SystemTimeSource))
    }

    /// Wire the services over an already-open store and an explicit clock.
    pub fn with_store_and_clock<S, T>(config: RuntimeConfig, store: Arc<S>, clock: Arc<T>) -> Self
    where
        S: DocumentRepository + NotificationRepository + 'static,
        T: TimeSource + 'static,
    {
        let event_bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));

        let documents: Arc<dyn DocumentApi> = Arc::new(DocumentService::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.service.clone(),
        ));
        let notifications: Arc<dyn NotificationApi> = Arc::new(NotificationService::new(
            Arc::clone(&store),
            store,
            clock,
            config.service.clone(),
        ));

        let publisher: Arc<dyn EventPublisher> = event_bus.clone();
        let handler = Arc::new(DocumentServiceHandler::new(
            Arc::clone(&documents),
            Arc::clone(&notifications),
            publisher,
            &config.service,
        ));

        Self {
            config,
            event_bus,
            documents,
            notifications,
            handler,
        }
    }
}
