//! # Activity Log
//!
//! Writes one structured log line per mutation event and reports critical
//! errors from the dead letter topic.

use shared_bus::{DomainEvent, EventFilter, EventTopic, Subscription};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Subscriber that records user activity.
pub struct ActivityLogHandler {
    subscription: Subscription,
    recorded: Arc<AtomicU64>,
}

impl ActivityLogHandler {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription,
            recorded: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Documents, notifications and critical errors.
    #[must_use]
    pub fn filter() -> EventFilter {
        EventFilter::topics(vec![
            EventTopic::Documents,
            EventTopic::Notifications,
            EventTopic::DeadLetterQueue,
        ])
    }

    /// Shared counter of recorded events.
    pub fn recorded(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.recorded)
    }

    pub async fn run(mut self) {
        info!("[activity] Activity log started");

        while let Some(event) = self.subscription.recv().await {
            record(&event);
            self.recorded.fetch_add(1, Ordering::Relaxed);
        }

        debug!("[activity] Event bus closed, activity log stopping");
    }
}

fn record(event: &DomainEvent) {
    match event {
        DomainEvent::DocumentCreated { user_id, document_id } => {
            info!(user_id = %user_id, document_id = %document_id, "[activity] document created");
        }
        DomainEvent::DocumentEdited { user_id, document_id } => {
            info!(user_id = %user_id, document_id = %document_id, "[activity] document edited");
        }
        DomainEvent::DocumentDeleted { user_id, document_id } => {
            info!(user_id = %user_id, document_id = %document_id, "[activity] document deleted");
        }
        DomainEvent::NotificationCreated {
            user_id,
            document_id,
            notification_id,
        } => {
            info!(
                user_id = %user_id,
                document_id = %document_id,
                notification_id = %notification_id,
                "[activity] notification created"
            );
        }
        DomainEvent::NotificationEdited {
            user_id,
            document_id,
            notification_id,
        } => {
            info!(
                user_id = %user_id,
                document_id = %document_id,
                notification_id = %notification_id,
                "[activity] notification edited"
            );
        }
        DomainEvent::NotificationDeleted {
            user_id,
            document_id,
            notification_id,
        } => {
            info!(
                user_id = %user_id,
                document_id = %document_id,
                notification_id = %notification_id,
                "[activity] notification deleted"
            );
        }
        DomainEvent::CriticalError { source, error } => {
            error!(source = %source, error = %error, "[activity] critical error reported");
        }
        DomainEvent::ApiQuery { .. } | DomainEvent::ApiQueryResponse { .. } => {}
    }
}
