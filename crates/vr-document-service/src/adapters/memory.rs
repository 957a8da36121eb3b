//! # In-Memory Store
//!
//! Backs both repository ports with one `RwLock`-guarded state, so the
//! document cascade and the guarded notification insert are atomic.

use crate::domain::{
    Document, DocumentType, DocumentUpdate, Notification, NotificationUpdate, StoreError,
};
use crate::ports::outbound::{DocumentRepository, InsertOutcome, NotificationRepository};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DocumentId, NotificationId, UserId};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    /// Insertion order; breaks `created_at` ties in `find_latest`.
    seq: u64,
}

#[derive(Debug, Default)]
struct State {
    documents: HashMap<DocumentId, StoredDocument>,
    notifications: HashMap<NotificationId, Notification>,
    next_seq: u64,
}

impl State {
    fn owned(&self, owner: UserId) -> impl Iterator<Item = &StoredDocument> {
        self.documents
            .values()
            .filter(move |d| d.document.user_id == owner)
    }

    fn owns(&self, id: DocumentId, owner: UserId) -> bool {
        self.documents
            .get(&id)
            .is_some_and(|d| d.document.user_id == owner)
    }

    fn children(&self, document_id: DocumentId) -> impl Iterator<Item = &Notification> {
        self.notifications
            .values()
            .filter(move |n| n.document_id == document_id)
    }
}

/// In-process document and notification store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total notifications held, across all users.
    #[must_use]
    pub fn notification_rows(&self) -> usize {
        self.state.read().notifications.len()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryStore {
    async fn insert_one(
        &self,
        document: Document,
        max_per_owner: u64,
    ) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.write();
        let owned = state.owned(document.user_id).count() as u64;
        if owned >= max_per_owner {
            return Ok(InsertOutcome::QuotaReached);
        }
        if state.documents.contains_key(&document.id) {
            return Err(StoreError::Corrupted {
                message: format!("duplicate document id {}", document.id),
            });
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state
            .documents
            .insert(document.id, StoredDocument { document, seq });
        Ok(InsertOutcome::Inserted)
    }

    async fn update_one(&self, update: DocumentUpdate) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        match state.documents.get_mut(&update.id) {
            Some(stored) if stored.document.user_id == update.user_id => {
                stored.document.apply(update.fields, update.updated_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_one(&self, id: DocumentId, owner: UserId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        if !state.owns(id, owner) {
            return Ok(false);
        }
        state.documents.remove(&id);
        state.notifications.retain(|_, n| n.document_id != id);
        Ok(true)
    }

    async fn find_one(
        &self,
        id: DocumentId,
        owner: UserId,
    ) -> Result<Option<Document>, StoreError> {
        let state = self.state.read();
        Ok(state
            .documents
            .get(&id)
            .filter(|d| d.document.user_id == owner)
            .map(|d| d.document.clone()))
    }

    async fn find_all(&self, owner: UserId) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read();
        Ok(state.owned(owner).map(|d| d.document.clone()).collect())
    }

    async fn exists(&self, id: DocumentId, owner: UserId) -> Result<bool, StoreError> {
        Ok(self.state.read().owns(id, owner))
    }

    async fn count(&self, owner: UserId) -> Result<u64, StoreError> {
        Ok(self.state.read().owned(owner).count() as u64)
    }

    async fn count_grouped_by_type(
        &self,
        owner: UserId,
    ) -> Result<BTreeMap<DocumentType, u64>, StoreError> {
        let state = self.state.read();
        let mut counts = BTreeMap::new();
        for stored in state.owned(owner) {
            *counts.entry(stored.document.document_type).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn find_latest(&self, owner: UserId, limit: usize) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read();
        let mut owned: Vec<&StoredDocument> = state.owned(owner).collect();
        owned.sort_by_key(|d| Reverse((d.document.created_at, d.seq)));
        Ok(owned
            .into_iter()
            .take(limit)
            .map(|d| d.document.clone())
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn insert_one(
        &self,
        notification: Notification,
        max_per_document: u64,
    ) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.write();
        if !state.owns(notification.document_id, notification.user_id) {
            return Ok(InsertOutcome::ParentMissing);
        }
        if state.children(notification.document_id).count() as u64 >= max_per_document {
            return Ok(InsertOutcome::QuotaReached);
        }
        state.notifications.insert(notification.id, notification);
        Ok(InsertOutcome::Inserted)
    }

    async fn update_one(&self, update: NotificationUpdate) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        match state.notifications.get_mut(&update.id) {
            Some(n) if n.document_id == update.document_id => {
                n.date = update.date;
                n.updated_at = update.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_one(
        &self,
        id: NotificationId,
        document_id: DocumentId,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        let matches = state
            .notifications
            .get(&id)
            .is_some_and(|n| n.document_id == document_id);
        if matches {
            state.notifications.remove(&id);
        }
        Ok(matches)
    }

    async fn find_all(&self, document_id: DocumentId) -> Result<Vec<Notification>, StoreError> {
        let state = self.state.read();
        Ok(state.children(document_id).cloned().collect())
    }

    async fn count(&self, document_id: DocumentId) -> Result<u64, StoreError> {
        Ok(self.state.read().children(document_id).count() as u64)
    }

    async fn count_all(&self, owner: UserId) -> Result<u64, StoreError> {
        let state = self.state.read();
        Ok(state
            .notifications
            .values()
            .filter(|n| state.owns(n.document_id, owner))
            .count() as u64)
    }

    async fn find_all_for_user(&self, owner: UserId) -> Result<Vec<Notification>, StoreError> {
        let state = self.state.read();
        Ok(state
            .notifications
            .values()
            .filter(|n| state.owns(n.document_id, owner))
            .cloned()
            .collect())
    }
}
