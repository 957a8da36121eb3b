//! # Service Container
//!
//! Holds the store, both services, the request handler and the event bus,
//! built once at startup and shared by every background task.

pub mod config;
pub mod services;

pub use config::{ConfigError, RuntimeConfig, StorageBackend};
pub use services::{ContainerError, DocumentHandler, ServiceContainer};
