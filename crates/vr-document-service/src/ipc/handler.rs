//! # Document Service Handler
//!
//! Executes [`DocumentRequest`]s against the services.
//!
//! ## Contract
//!
//! - Each request runs under the configured deadline; on expiry the work is
//!   dropped and `Timeout` is returned.
//! - After a successful mutation a [`DomainEvent`] is handed to a spawned
//!   task for publishing. The caller's result never depends on that publish.

use crate::config::ServiceConfig;
use crate::domain::{DocumentDetails, DomainError};
use crate::ipc::payloads::{
    document_input, DocumentRequest, DocumentResponse, ErrorPayload, TypeCount,
};
use crate::ports::inbound::{DocumentApi, NotificationApi};
use crate::service::{user_calendar, user_statistics};
use shared_bus::{DomainEvent, EventPublisher};
use shared_types::{DocumentId, NotificationId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

type Outcome = Result<(DocumentResponse, Option<DomainEvent>), DomainError>;

/// Request executor wrapping both services.
pub struct DocumentServiceHandler<D: ?Sized, N: ?Sized> {
    documents: Arc<D>,
    notifications: Arc<N>,
    publisher: Arc<dyn EventPublisher>,
    deadline: Duration,
}

impl<D, N> DocumentServiceHandler<D, N>
where
    D: DocumentApi + ?Sized,
    N: NotificationApi + ?Sized,
{
    pub fn new(
        documents: Arc<D>,
        notifications: Arc<N>,
        publisher: Arc<dyn EventPublisher>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            documents,
            notifications,
            publisher,
            deadline: config.operation_timeout(),
        }
    }

    /// Execute a request, reporting failures as wire payloads.
    pub async fn handle(&self, request: DocumentRequest) -> Result<DocumentResponse, ErrorPayload> {
        self.execute(request).await.map_err(|e| ErrorPayload::from(&e))
    }

    /// Execute a request, reporting failures as typed errors.
    pub async fn execute(&self, request: DocumentRequest) -> Result<DocumentResponse, DomainError> {
        let method = request.method();
        debug!(method, "[vr-docs] handling request");

        let outcome = tokio::time::timeout(self.deadline, self.dispatch(request)).await;
        let (response, event) = match outcome {
            Ok(outcome) => outcome?,
            Err(_) => {
                let deadline_ms = u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX);
                warn!(method, deadline_ms, "[vr-docs] request timed out");
                return Err(DomainError::Timeout {
                    operation: method,
                    deadline_ms,
                });
            }
        };

        if let Some(event) = event {
            self.emit(event);
        }
        Ok(response)
    }

    /// Publish without waiting.
    fn emit(&self, event: DomainEvent) {
        let publisher = Arc::clone(&self.publisher);
        tokio::spawn(async move {
            publisher.publish(event).await;
        });
    }

    async fn dispatch(&self, request: DocumentRequest) -> Outcome {
        match request {
            // -----------------------------------------------------------------
            // Documents
            // -----------------------------------------------------------------
            DocumentRequest::CreateDocument {
                user_id,
                title,
                document_type,
                description,
                expires_at,
            } => {
                let input = document_input(title, document_type, description, expires_at);
                let document_id = self.documents.create(&user_id, input).await?;
                let event = UserId::parse(&user_id)
                    .ok()
                    .map(|user_id| DomainEvent::DocumentCreated {
                        user_id,
                        document_id,
                    });
                Ok((DocumentResponse::DocumentCreated { document_id }, event))
            }
            DocumentRequest::EditDocument {
                document_id,
                user_id,
                title,
                document_type,
                description,
                expires_at,
            } => {
                let input = document_input(title, document_type, description, expires_at);
                self.documents.edit(&document_id, &user_id, input).await?;
                let event = document_event(&user_id, &document_id, |user_id, document_id| {
                    DomainEvent::DocumentEdited {
                        user_id,
                        document_id,
                    }
                });
                Ok((DocumentResponse::Done, event))
            }
            DocumentRequest::DeleteDocument {
                document_id,
                user_id,
            } => {
                self.documents.delete(&document_id, &user_id).await?;
                let event = document_event(&user_id, &document_id, |user_id, document_id| {
                    DomainEvent::DocumentDeleted {
                        user_id,
                        document_id,
                    }
                });
                Ok((DocumentResponse::Done, event))
            }
            DocumentRequest::GetDocument {
                document_id,
                user_id,
            } => {
                let document = self.documents.get_one(&document_id, &user_id).await?;
                let notifications = self.notifications.get_all(&user_id, &document_id).await?;
                let details = DocumentDetails {
                    document,
                    notifications,
                };
                Ok((DocumentResponse::Document(details), None))
            }
            DocumentRequest::ListDocuments { user_id } => {
                let documents = self.documents.get_all(&user_id).await?;
                Ok((DocumentResponse::Documents(documents), None))
            }
            DocumentRequest::CountDocuments { user_id } => {
                let count = self.documents.count(&user_id).await?;
                Ok((DocumentResponse::Count(count), None))
            }
            DocumentRequest::CountDocumentsByType { user_id } => {
                let counts = self.documents.count_by_type(&user_id).await?;
                Ok((DocumentResponse::TypeCounts(TypeCount::from_map(counts)), None))
            }
            DocumentRequest::LatestDocuments { user_id } => {
                let documents = self.documents.find_latest(&user_id).await?;
                Ok((DocumentResponse::Documents(documents), None))
            }
            DocumentRequest::UserStatistics { user_id } => {
                let stats =
                    user_statistics(&*self.documents, &*self.notifications, &user_id).await?;
                Ok((DocumentResponse::Statistics(stats), None))
            }

            // -----------------------------------------------------------------
            // Notifications
            // -----------------------------------------------------------------
            DocumentRequest::CreateNotification {
                user_id,
                document_id,
                date,
            } => {
                let notification_id = self
                    .notifications
                    .create(&user_id, &document_id, date)
                    .await?;
                let event = notification_event(
                    &user_id,
                    &document_id,
                    notification_id,
                    |user_id, document_id, notification_id| DomainEvent::NotificationCreated {
                        user_id,
                        document_id,
                        notification_id,
                    },
                );
                Ok((DocumentResponse::NotificationCreated { notification_id }, event))
            }
            DocumentRequest::EditNotification {
                notification_id,
                user_id,
                document_id,
                date,
            } => {
                self.notifications
                    .edit(&notification_id, &user_id, &document_id, date)
                    .await?;
                let event = match NotificationId::parse(&notification_id) {
                    Ok(id) => notification_event(
                        &user_id,
                        &document_id,
                        id,
                        |user_id, document_id, notification_id| DomainEvent::NotificationEdited {
                            user_id,
                            document_id,
                            notification_id,
                        },
                    ),
                    Err(_) => None,
                };
                Ok((DocumentResponse::Done, event))
            }
            DocumentRequest::DeleteNotification {
                notification_id,
                user_id,
                document_id,
            } => {
                self.notifications
                    .delete(&notification_id, &user_id, &document_id)
                    .await?;
                let event = match NotificationId::parse(&notification_id) {
                    Ok(id) => notification_event(
                        &user_id,
                        &document_id,
                        id,
                        |user_id, document_id, notification_id| DomainEvent::NotificationDeleted {
                            user_id,
                            document_id,
                            notification_id,
                        },
                    ),
                    Err(_) => None,
                };
                Ok((DocumentResponse::Done, event))
            }
            DocumentRequest::ListNotifications {
                user_id,
                document_id,
            } => {
                let notifications = self.notifications.get_all(&user_id, &document_id).await?;
                Ok((DocumentResponse::Notifications(notifications), None))
            }
            DocumentRequest::CountNotifications {
                user_id,
                document_id,
            } => {
                let count = self.notifications.count(&user_id, &document_id).await?;
                Ok((DocumentResponse::Count(count), None))
            }
            DocumentRequest::CountAllNotifications { user_id } => {
                let count = self.notifications.count_all(&user_id).await?;
                Ok((DocumentResponse::Count(count), None))
            }
            DocumentRequest::ListUserNotifications { user_id } => {
                let notifications = self.notifications.get_all_for_user(&user_id).await?;
                Ok((DocumentResponse::Notifications(notifications), None))
            }
            DocumentRequest::UserCalendar { user_id } => {
                let calendar =
                    user_calendar(&*self.documents, &*self.notifications, &user_id).await?;
                Ok((DocumentResponse::Calendar(calendar), None))
            }
        }
    }
}

/// Event for a document mutation. Ids were already accepted by the service.
fn document_event(
    user_id: &str,
    document_id: &str,
    make: fn(UserId, DocumentId) -> DomainEvent,
) -> Option<DomainEvent> {
    let user_id = UserId::parse(user_id).ok()?;
    let document_id = DocumentId::parse(document_id).ok()?;
    Some(make(user_id, document_id))
}

fn notification_event(
    user_id: &str,
    document_id: &str,
    notification_id: NotificationId,
    make: fn(UserId, DocumentId, NotificationId) -> DomainEvent,
) -> Option<DomainEvent> {
    let user_id = UserId::parse(user_id).ok()?;
    let document_id = DocumentId::parse(document_id).ok()?;
    Some(make(user_id, document_id, notification_id))
}
