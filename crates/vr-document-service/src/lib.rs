//! # Document Service (vr-document-service)
//!
//! Owns user documents with expiration dates and the reminder notifications
//! attached to them.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Every read and write is scoped to the calling user | repository `(id, owner)` lookups |
//! | A notification's parent exists and is owned by the caller | `NotificationService` precondition + guarded insert |
//! | At most N documents per user, M notifications per document | atomic count-and-insert in the repository |
//! | Deleting a document deletes its notifications | repository `delete_one`, single lock / write batch |
//! | Titles and descriptions are trimmed, bounded and escaped | `domain::validation` |
//! | Every call finishes within its deadline or fails with `Timeout` | `ipc::DocumentServiceHandler` |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - entities, value objects, validation, errors
//! - `ports/` - inbound API traits, outbound repository traits
//! - `adapters/` - in-memory store, clocks
//! - `service/` - application services implementing the inbound ports
//! - `ipc/` - request/response payloads and the deadline-enforcing handler
//!
//! ## Usage
//!
//! ```ignore
//! use vr_document_service::{DocumentApi, DocumentInput, DocumentService, InMemoryStore};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let documents = DocumentService::new(store, Arc::new(SystemTimeSource), ServiceConfig::default());
//!
//! let id = documents.create(&user_id, DocumentInput::new("Passport", expires_at)).await?;
//! let doc = documents.get_one(&id.to_string(), &user_id).await?;
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use adapters::{InMemoryStore, ManualTimeSource, SystemTimeSource};
pub use config::{ConfigError, ServiceConfig};
pub use domain::{
    build_calendar, escape_reserved, CalendarEntry, Document, DocumentDetails, DocumentFields,
    DocumentInput, DocumentType, DocumentUpdate, DomainError, ErrorKind, Notification,
    NotificationUpdate, QuotaScope, StoreError, UserStatistics, ValidationError,
};
pub use ports::inbound::{DocumentApi, NotificationApi};
pub use ports::outbound::{DocumentRepository, InsertOutcome, NotificationRepository, TimeSource};
pub use service::{user_calendar, user_statistics, DocumentService, NotificationService};

// Re-export IPC types
pub use ipc::{DocumentRequest, DocumentResponse, DocumentServiceHandler, ErrorPayload, TypeCount};
