//! # Storage Adapters
//!
//! Persistent backends for the document and notification repositories.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbDocumentStore};
