//! # Notification Service
//!
//! Every operation scoped to a document first checks that the document
//! exists and belongs to the caller. Notification ownership follows from that
//! check; there is no separate per-notification owner test.

use super::helpers::{parse_document, parse_notification, parse_user, storage_failure};
use crate::config::ServiceConfig;
use crate::domain::{
    validate_notification_date, DomainError, Notification, NotificationUpdate, QuotaScope,
};
use crate::ports::inbound::NotificationApi;
use crate::ports::outbound::{DocumentRepository, InsertOutcome, NotificationRepository, TimeSource};
use async_trait::async_trait;
use shared_types::{DocumentId, NotificationId, Timestamp, UserId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification operations over a [`NotificationRepository`], guarded by a
/// [`DocumentRepository`] existence check.
pub struct NotificationService<N, D, T> {
    notifications: Arc<N>,
    documents: Arc<D>,
    time_source: Arc<T>,
    config: ServiceConfig,
}

impl<N, D, T> NotificationService<N, D, T>
where
    N: NotificationRepository,
    D: DocumentRepository,
    T: TimeSource,
{
    pub fn new(
        notifications: Arc<N>,
        documents: Arc<D>,
        time_source: Arc<T>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            notifications,
            documents,
            time_source,
            config,
        }
    }

    /// Parse `(user_id, document_id)` and require the parent document.
    async fn verify_parent(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<(UserId, DocumentId), DomainError> {
        let user_id = parse_user(user_id)?;
        let document_id = parse_document(document_id)?;
        self.ensure_parent(user_id, document_id).await?;
        Ok((user_id, document_id))
    }

    async fn ensure_parent(
        &self,
        user_id: UserId,
        document_id: DocumentId,
    ) -> Result<(), DomainError> {
        let exists = self
            .documents
            .exists(document_id, user_id)
            .await
            .map_err(storage_failure("verify_parent"))?;
        if !exists {
            warn!(
                user_id = %user_id,
                document_id = %document_id,
                "[vr-docs] parent document missing"
            );
            return Err(DomainError::DocumentNotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl<N, D, T> NotificationApi for NotificationService<N, D, T>
where
    N: NotificationRepository,
    D: DocumentRepository,
    T: TimeSource,
{
    async fn create(
        &self,
        user_id: &str,
        document_id: &str,
        date: Option<Timestamp>,
    ) -> Result<NotificationId, DomainError> {
        let user_id = parse_user(user_id)?;
        let document_id = parse_document(document_id)?;
        let date = validate_notification_date(date)?;
        self.ensure_parent(user_id, document_id).await?;

        let notification = Notification::new(
            NotificationId::generate(),
            document_id,
            user_id,
            date,
            self.time_source.now(),
        );
        let id = notification.id;
        let limit = self.config.max_notifications_per_document;

        let outcome = self
            .notifications
            .insert_one(notification, limit)
            .await
            .map_err(storage_failure("create_notification"))?;

        match outcome {
            InsertOutcome::Inserted => {
                info!(
                    user_id = %user_id,
                    document_id = %document_id,
                    notification_id = %id,
                    "[vr-docs] notification created"
                );
                Ok(id)
            }
            InsertOutcome::QuotaReached => {
                warn!(document_id = %document_id, limit, "[vr-docs] notification quota reached");
                Err(DomainError::QuotaExceeded {
                    scope: QuotaScope::NotificationsPerDocument,
                    limit,
                })
            }
            InsertOutcome::ParentMissing => {
                // Deleted between the existence check and the insert
                warn!(document_id = %document_id, "[vr-docs] parent vanished during insert");
                Err(DomainError::DocumentNotFound)
            }
        }
    }

    async fn edit(
        &self,
        notification_id: &str,
        user_id: &str,
        document_id: &str,
        date: Option<Timestamp>,
    ) -> Result<(), DomainError> {
        let user_id = parse_user(user_id)?;
        let document_id = parse_document(document_id)?;
        let notification_id = parse_notification(notification_id)?;
        let date = validate_notification_date(date)?;
        self.ensure_parent(user_id, document_id).await?;

        let update = NotificationUpdate {
            id: notification_id,
            document_id,
            date,
            updated_at: self.time_source.now(),
        };
        let matched = self
            .notifications
            .update_one(update)
            .await
            .map_err(storage_failure("edit_notification"))?;

        if !matched {
            warn!(
                notification_id = %notification_id,
                "[vr-docs] notification edit matched nothing"
            );
            return Err(DomainError::NotFoundOrForbidden);
        }
        info!(notification_id = %notification_id, "[vr-docs] notification edited");
        Ok(())
    }

    async fn delete(
        &self,
        notification_id: &str,
        user_id: &str,
        document_id: &str,
    ) -> Result<(), DomainError> {
        let user_id = parse_user(user_id)?;
        let document_id = parse_document(document_id)?;
        let notification_id = parse_notification(notification_id)?;
        self.ensure_parent(user_id, document_id).await?;

        let matched = self
            .notifications
            .delete_one(notification_id, document_id)
            .await
            .map_err(storage_failure("delete_notification"))?;

        if !matched {
            warn!(
                notification_id = %notification_id,
                "[vr-docs] notification delete matched nothing"
            );
            return Err(DomainError::NotFoundOrForbidden);
        }
        info!(notification_id = %notification_id, "[vr-docs] notification deleted");
        Ok(())
    }

    async fn get_all(
        &self,
        user_id: &str,
        document_id: &str,
    ) -> Result<Vec<Notification>, DomainError> {
        let (_, document_id) = self.verify_parent(user_id, document_id).await?;
        let notifications = self
            .notifications
            .find_all(document_id)
            .await
            .map_err(storage_failure("list_notifications"))?;
        debug!(
            document_id = %document_id,
            count = notifications.len(),
            "[vr-docs] listed notifications"
        );
        Ok(notifications)
    }

    async fn count(&self, user_id: &str, document_id: &str) -> Result<u64, DomainError> {
        let (_, document_id) = self.verify_parent(user_id, document_id).await?;
        self.notifications
            .count(document_id)
            .await
            .map_err(storage_failure("count_notifications"))
    }

    async fn count_all(&self, user_id: &str) -> Result<u64, DomainError> {
        let user_id = parse_user(user_id)?;
        self.notifications
            .count_all(user_id)
            .await
            .map_err(storage_failure("count_all_notifications"))
    }

    async fn get_all_for_user(&self, user_id: &str) -> Result<Vec<Notification>, DomainError> {
        let user_id = parse_user(user_id)?;
        self.notifications
            .find_all_for_user(user_id)
            .await
            .map_err(storage_failure("list_user_notifications"))
    }
}
