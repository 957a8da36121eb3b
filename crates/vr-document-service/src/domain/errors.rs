//! # Domain Errors
//!
//! Every failure the document service can report.
//!
//! Identifier and validation failures are detected before storage is
//! touched. Storage failures pass through unchanged as
//! [`DomainError::InternalStorage`]; the domain layer never retries.

use crate::domain::validation::ValidationError;
use crate::domain::value_objects::QuotaScope;
use serde::{Deserialize, Serialize};
use shared_types::IdParseError;
use thiserror::Error;

/// Opaque backing-store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Underlying engine reported an I/O or connectivity failure.
    #[error("storage I/O failed: {message}")]
    Io { message: String },

    /// A stored record could not be encoded or decoded.
    #[error("storage serialization failed: {message}")]
    Serialization { message: String },

    /// Stored data violates an internal invariant.
    #[error("storage corrupted: {message}")]
    Corrupted { message: String },
}

/// Errors returned by document and notification operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed user identifier.
    #[error("invalid user id")]
    InvalidUserId(#[source] IdParseError),

    /// Malformed document identifier.
    #[error("invalid document_id")]
    InvalidDocumentId(#[source] IdParseError),

    /// Malformed notification identifier.
    #[error("invalid notification_id")]
    InvalidNotificationId(#[source] IdParseError),

    /// An entity field constraint was violated.
    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Per-user document limit or per-document notification limit reached.
    #[error("quota exceeded: at most {limit} {scope}")]
    QuotaExceeded { scope: QuotaScope, limit: u64 },

    /// Parent document missing or owned by someone else.
    #[error("document does not exist")]
    DocumentNotFound,

    /// Scoped read or write matched nothing.
    ///
    /// Deliberately does not say whether the row is missing or foreign.
    #[error("not found or you don't have permission")]
    NotFoundOrForbidden,

    /// Backing store failed.
    #[error("internal storage error: {0}")]
    InternalStorage(#[from] StoreError),

    /// Operation did not finish before its deadline.
    #[error("{operation} timed out after {deadline_ms}ms")]
    Timeout {
        operation: &'static str,
        deadline_ms: u64,
    },
}

/// Flat classification of [`DomainError`] for transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUserId,
    InvalidDocumentId,
    InvalidNotificationId,
    ValidationFailed,
    QuotaExceeded,
    DocumentNotFound,
    NotFoundOrForbidden,
    InternalStorage,
    Timeout,
}

impl ErrorKind {
    /// Numeric code used on the bus.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidUserId => -32001,
            Self::InvalidDocumentId => -32002,
            Self::InvalidNotificationId => -32003,
            Self::ValidationFailed => -32004,
            Self::QuotaExceeded => -32005,
            Self::DocumentNotFound => -32006,
            Self::NotFoundOrForbidden => -32007,
            Self::InternalStorage => -32008,
            Self::Timeout => -32009,
        }
    }

    /// Reverse of [`ErrorKind::code`].
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        [
            Self::InvalidUserId,
            Self::InvalidDocumentId,
            Self::InvalidNotificationId,
            Self::ValidationFailed,
            Self::QuotaExceeded,
            Self::DocumentNotFound,
            Self::NotFoundOrForbidden,
            Self::InternalStorage,
            Self::Timeout,
        ]
        .into_iter()
        .find(|k| k.code() == code)
    }
}

impl DomainError {
    /// Classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUserId(_) => ErrorKind::InvalidUserId,
            Self::InvalidDocumentId(_) => ErrorKind::InvalidDocumentId,
            Self::InvalidNotificationId(_) => ErrorKind::InvalidNotificationId,
            Self::ValidationFailed(_) => ErrorKind::ValidationFailed,
            Self::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::DocumentNotFound => ErrorKind::DocumentNotFound,
            Self::NotFoundOrForbidden => ErrorKind::NotFoundOrForbidden,
            Self::InternalStorage(_) => ErrorKind::InternalStorage,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }
}
