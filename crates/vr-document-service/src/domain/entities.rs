//! # Domain Entities
//!
//! Documents, their notifications, and the read-side projections built
//! from them.

use crate::domain::value_objects::{DocumentFields, DocumentType};
use serde::{Deserialize, Serialize};
use shared_types::{DocumentId, NotificationId, Timestamp, UserId};
use std::collections::BTreeMap;

/// A user-owned record of something that expires.
///
/// `title` and `description` are stored normalised (trimmed and escaped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub user_id: UserId,
    pub document_type: DocumentType,
    pub title: String,
    pub description: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Document {
    /// Build a new document from validated fields.
    #[must_use]
    pub fn new(id: DocumentId, user_id: UserId, fields: DocumentFields, now: Timestamp) -> Self {
        Self {
            id,
            user_id,
            document_type: fields.document_type,
            title: fields.title,
            description: fields.description,
            expires_at: fields.expires_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the mutable fields. `created_at` is never touched.
    pub fn apply(&mut self, fields: DocumentFields, now: Timestamp) {
        self.document_type = fields.document_type;
        self.title = fields.title;
        self.description = fields.description;
        self.expires_at = fields.expires_at;
        self.updated_at = now;
    }
}

/// A scheduled reminder tied to exactly one document.
///
/// `user_id` is a copy of the parent document's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub document_id: DocumentId,
    pub user_id: UserId,
    pub date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Notification {
    #[must_use]
    pub fn new(
        id: NotificationId,
        document_id: DocumentId,
        user_id: UserId,
        date: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            document_id,
            user_id,
            date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Scoped overwrite of a document's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub id: DocumentId,
    pub user_id: UserId,
    pub fields: DocumentFields,
    pub updated_at: Timestamp,
}

/// Scoped change of a notification's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationUpdate {
    pub id: NotificationId,
    pub document_id: DocumentId,
    pub date: Timestamp,
    pub updated_at: Timestamp,
}

/// A document together with its notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDetails {
    pub document: Document,
    pub notifications: Vec<Notification>,
}

/// Per-user overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    /// Total documents owned.
    pub total: u64,
    /// Document count per type; only non-empty buckets are present.
    pub by_type: BTreeMap<DocumentType, u64>,
    /// Most recently created documents, newest first.
    pub latest: Vec<Document>,
    /// Notifications across all owned documents.
    pub total_notifications: u64,
}

/// One reminder in a user's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub document_id: DocumentId,
    pub document_title: String,
    pub notification_id: NotificationId,
    pub notification_date: Timestamp,
    pub expires_at: Timestamp,
}

/// Join a user's notifications with their documents.
///
/// Notifications whose parent is missing from `documents` are skipped.
/// Entries are ordered by notification date, then notification id.
#[must_use]
pub fn build_calendar(
    documents: &[Document],
    notifications: &[Notification],
) -> Vec<CalendarEntry> {
    let by_id: BTreeMap<DocumentId, &Document> = documents.iter().map(|d| (d.id, d)).collect();

    let mut entries: Vec<CalendarEntry> = notifications
        .iter()
        .filter_map(|n| {
            let document = by_id.get(&n.document_id)?;
            Some(CalendarEntry {
                document_id: document.id,
                document_title: document.title.clone(),
                notification_id: n.id,
                notification_date: n.date,
                expires_at: document.expires_at,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        a.notification_date
            .cmp(&b.notification_date)
            .then_with(|| a.notification_id.cmp(&b.notification_id))
    });
    entries
}
