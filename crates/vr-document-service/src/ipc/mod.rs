//! # IPC Module
//!
//! Request/response transport for the document service.
//!
//! - `payloads`: one serde-tagged request variant per operation
//! - `handler`: runs a request under the deadline and emits domain events

pub mod handler;
pub mod payloads;

pub use handler::DocumentServiceHandler;
pub use payloads::{DocumentRequest, DocumentResponse, ErrorPayload, TypeCount};
