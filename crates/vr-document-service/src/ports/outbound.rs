//! # Outbound Ports (Driven Side)
//!
//! Persistence and clock contracts required by the services.
//!
//! Every document lookup is scoped by `(id, owner)`. Quota checks and the
//! parent-existence re-check happen inside the insert call, so implementations
//! must make count-then-insert atomic with respect to other writers.

use crate::domain::{
    Document, DocumentType, DocumentUpdate, Notification, NotificationUpdate, StoreError,
};
use async_trait::async_trait;
use shared_types::{DocumentId, NotificationId, Timestamp, UserId};
use std::collections::BTreeMap;

/// Result of a guarded insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row written.
    Inserted,
    /// Quota already reached; nothing written.
    QuotaReached,
    /// Parent document vanished (or is foreign); nothing written.
    ParentMissing,
}

/// Document persistence.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert unless the owner already has `max_per_owner` documents.
    async fn insert_one(
        &self,
        document: Document,
        max_per_owner: u64,
    ) -> Result<InsertOutcome, StoreError>;

    /// Overwrite mutable fields of the row matching `(id, user_id)`.
    ///
    /// Returns `false` when no row matched.
    async fn update_one(&self, update: DocumentUpdate) -> Result<bool, StoreError>;

    /// Delete the row matching `(id, owner)` together with all of its
    /// notifications, atomically.
    ///
    /// Returns `false` when no row matched.
    async fn delete_one(&self, id: DocumentId, owner: UserId) -> Result<bool, StoreError>;

    /// Scoped read.
    async fn find_one(&self, id: DocumentId, owner: UserId)
        -> Result<Option<Document>, StoreError>;

    /// All documents of `owner`, in no particular order.
    async fn find_all(&self, owner: UserId) -> Result<Vec<Document>, StoreError>;

    /// Whether a document matching `(id, owner)` exists.
    async fn exists(&self, id: DocumentId, owner: UserId) -> Result<bool, StoreError>;

    /// Number of documents owned by `owner`.
    async fn count(&self, owner: UserId) -> Result<u64, StoreError>;

    /// Document count per type for `owner`. Empty buckets are omitted.
    async fn count_grouped_by_type(
        &self,
        owner: UserId,
    ) -> Result<BTreeMap<DocumentType, u64>, StoreError>;

    /// The `limit` most recently created documents, newest first.
    async fn find_latest(&self, owner: UserId, limit: usize) -> Result<Vec<Document>, StoreError>;
}

/// Notification persistence.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert if the parent `(document_id, user_id)` still exists and has
    /// fewer than `max_per_document` notifications.
    async fn insert_one(
        &self,
        notification: Notification,
        max_per_document: u64,
    ) -> Result<InsertOutcome, StoreError>;

    /// Change the date of the row matching `(id, document_id)`.
    ///
    /// Returns `false` when no row matched.
    async fn update_one(&self, update: NotificationUpdate) -> Result<bool, StoreError>;

    /// Delete the row matching `(id, document_id)`.
    ///
    /// Returns `false` when no row matched.
    async fn delete_one(
        &self,
        id: NotificationId,
        document_id: DocumentId,
    ) -> Result<bool, StoreError>;

    /// All notifications of one document.
    async fn find_all(&self, document_id: DocumentId) -> Result<Vec<Notification>, StoreError>;

    /// Number of notifications of one document.
    async fn count(&self, document_id: DocumentId) -> Result<u64, StoreError>;

    /// Number of notifications across all documents of `owner`.
    async fn count_all(&self, owner: UserId) -> Result<u64, StoreError>;

    /// All notifications across all documents of `owner`.
    async fn find_all_for_user(&self, owner: UserId) -> Result<Vec<Notification>, StoreError>;
}

/// Abstract clock.
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> Timestamp;
}
