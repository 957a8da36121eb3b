//! # Inbound Ports (Driving Side)
//!
//! The operations the document service offers to callers.
//!
//! Identifiers arrive as strings exactly as the gateway received them; each
//! operation parses them before touching storage and reports malformed input
//! as the matching `Invalid*Id` error.

use crate::domain::{Document, DocumentInput, DocumentType, DomainError, Notification};
use async_trait::async_trait;
use shared_types::{DocumentId, NotificationId, Timestamp};
use std::collections::BTreeMap;

/// Document operations. Every call is scoped to `user_id`.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Create a document and return its new id.
    ///
    /// Fails with `QuotaExceeded` when the user is at the per-user limit.
    async fn create(&self, user_id: &str, input: DocumentInput)
        -> Result<DocumentId, DomainError>;

    /// Overwrite the mutable fields of one of the user's documents.
    async fn edit(
        &self,
        document_id: &str,
        user_id: &str,
        input: DocumentInput,
    ) -> Result<(), DomainError>;

    /// Delete one of the user's documents and all its notifications.
    async fn delete(&self, document_id: &str, user_id: &str) -> Result<(), DomainError>;

    /// Read one of the user's documents.
    async fn get_one(&self, document_id: &str, user_id: &str) -> Result<Document, DomainError>;

    /// All of the user's documents. An empty list is a valid answer.
    async fn get_all(&self, user_id: &str) -> Result<Vec<Document>, DomainError>;

    /// Number of documents the user owns.
    async fn count(&self, user_id: &str) -> Result<u64, DomainError>;

    /// Document count per type.
    async fn count_by_type(&self, user_id: &str)
        -> Result<BTreeMap<DocumentType, u64>, DomainError>;

    /// The most recently created documents (fixed limit), newest first.
    async fn find_latest(&self, user_id: &str) -> Result<Vec<Document>, DomainError>;
}

/// Notification operations.
///
/// Everything scoped to a document first verifies that the document exists
/// and belongs to `user_id`, failing with `DocumentNotFound` otherwise.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Attach a reminder to a document and return its id.
    async fn create(
        &self,
        user_id: &str,
        document_id: &str,
        date: Option<Timestamp>,
    ) -> Result<NotificationId, DomainError>;

    /// Move a reminder to a new date.
    async fn edit(
        &self,
        notification_id: &str,
        user_id: &str,
        document_id: &str,
        date: Option<Timestamp>,
    ) -> Result<(), DomainError>;

    /// Remove a reminder.
    async fn delete(
        &self,
        notification_id: &str,
        user_id: &str,
        document_id: &str,
    ) -> Result<(), DomainError>;

    /// All reminders of one document.
    async fn get_all(&self, user_id: &str, document_id: &str)
        -> Result<Vec<Notification>, DomainError>;

    /// Number of reminders of one document.
    async fn count(&self, user_id: &str, document_id: &str) -> Result<u64, DomainError>;

    /// Number of reminders across all of the user's documents.
    async fn count_all(&self, user_id: &str) -> Result<u64, DomainError>;

    /// All reminders across all of the user's documents.
    async fn get_all_for_user(&self, user_id: &str) -> Result<Vec<Notification>, DomainError>;
}
