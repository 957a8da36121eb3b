//! # Calendar Regeneration
//!
//! Rebuilds a user's reminder calendar after any document or notification
//! mutation and hands it to a [`CalendarSink`].
//!
//! Runs detached from the request path: a failed rebuild is logged and
//! never reaches the caller whose mutation triggered it.

use async_trait::async_trait;
use shared_bus::{DomainEvent, EventFilter, EventTopic, Subscription};
use shared_types::UserId;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use vr_document_service::{user_calendar, CalendarEntry, DocumentApi, NotificationApi};

/// Calendar delivery failure.
#[derive(Debug, Error)]
#[error("calendar sink failed: {0}")]
pub struct CalendarSinkError(pub String);

/// Destination for regenerated calendars (file renderer, push service, ...).
#[async_trait]
pub trait CalendarSink: Send + Sync {
    /// Replace the stored calendar of `user_id` with `entries`.
    async fn publish_calendar(
        &self,
        user_id: UserId,
        entries: Vec<CalendarEntry>,
    ) -> Result<(), CalendarSinkError>;
}

/// Sink that only logs the projection.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCalendarSink;

#[async_trait]
impl CalendarSink for LoggingCalendarSink {
    async fn publish_calendar(
        &self,
        user_id: UserId,
        entries: Vec<CalendarEntry>,
    ) -> Result<(), CalendarSinkError> {
        info!(
            user_id = %user_id,
            entries = entries.len(),
            next = ?entries.first().map(|e| e.notification_date),
            "[calendar] Calendar regenerated"
        );
        Ok(())
    }
}

/// Subscriber that regenerates calendars on mutation events.
pub struct CalendarRefreshHandler {
    documents: Arc<dyn DocumentApi>,
    notifications: Arc<dyn NotificationApi>,
    sink: Arc<dyn CalendarSink>,
    subscription: Subscription,
}

impl CalendarRefreshHandler {
    /// Subscribe to document and notification events.
    pub fn new(
        documents: Arc<dyn DocumentApi>,
        notifications: Arc<dyn NotificationApi>,
        sink: Arc<dyn CalendarSink>,
        subscription: Subscription,
    ) -> Self {
        Self {
            documents,
            notifications,
            sink,
            subscription,
        }
    }

    /// Filter matching every event that can change a calendar.
    #[must_use]
    pub fn filter() -> EventFilter {
        EventFilter::topics(vec![EventTopic::Documents, EventTopic::Notifications])
    }

    /// Process events until the bus closes.
    pub async fn run(mut self) {
        info!("[calendar] Calendar refresh handler started");

        while let Some(event) = self.subscription.recv().await {
            let Some(user_id) = mutated_user(&event) else {
                continue;
            };
            self.refresh(user_id).await;
        }

        debug!("[calendar] Event bus closed, calendar refresh handler stopping");
    }

    /// Rebuild and deliver one user's calendar.
    pub async fn refresh(&self, user_id: UserId) {
        let key = user_id.to_string();
        let entries =
            match user_calendar(self.documents.as_ref(), self.notifications.as_ref(), &key).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "[calendar] Calendar rebuild failed");
                    return;
                }
            };

        if let Err(e) = self.sink.publish_calendar(user_id, entries).await {
            error!(user_id = %user_id, error = %e, "[calendar] Calendar delivery failed");
        }
    }
}

fn mutated_user(event: &DomainEvent) -> Option<UserId> {
    if event.is_mutation() {
        event.user_id()
    } else {
        None
    }
}
