//! # Domain Events
//!
//! Every event type that flows through the shared bus.

use crate::{API_GATEWAY_SOURCE, DOCUMENT_SERVICE_SOURCE};
use serde::{Deserialize, Serialize};
use shared_types::{DocumentId, NotificationId, UserId};

/// All events that can be published to the event bus.
///
/// Mutation events are emitted after the write has been committed. Consumers
/// must treat them as hints: the bus gives no delivery guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    // =========================================================================
    // DOCUMENTS
    // =========================================================================
    /// A document was created.
    DocumentCreated {
        user_id: UserId,
        document_id: DocumentId,
    },

    /// A document's mutable fields were overwritten.
    DocumentEdited {
        user_id: UserId,
        document_id: DocumentId,
    },

    /// A document and all its notifications were deleted.
    DocumentDeleted {
        user_id: UserId,
        document_id: DocumentId,
    },

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================
    /// A notification was attached to a document.
    NotificationCreated {
        user_id: UserId,
        document_id: DocumentId,
        notification_id: NotificationId,
    },

    /// A notification's date was changed.
    NotificationEdited {
        user_id: UserId,
        document_id: DocumentId,
        notification_id: NotificationId,
    },

    /// A notification was removed.
    NotificationDeleted {
        user_id: UserId,
        document_id: DocumentId,
        notification_id: NotificationId,
    },

    // =========================================================================
    // CRITICAL EVENTS (DLQ)
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError {
        /// The component that encountered the error.
        source: String,
        /// Error description.
        error: String,
    },

    // =========================================================================
    // API GATEWAY QUERIES
    // =========================================================================
    /// Query from the gateway to a component.
    /// The target component should respond with `ApiQueryResponse`.
    ApiQuery {
        /// Unique correlation ID to match request/response.
        correlation_id: String,
        /// Target component (e.g., "vr-document-service").
        target: String,
        /// Query method name (e.g., "create_document").
        method: String,
        /// Query parameters as JSON.
        params: serde_json::Value,
    },

    /// Response from a component to a gateway query.
    ApiQueryResponse {
        /// Correlation ID matching the original query.
        correlation_id: String,
        /// Responding component.
        source: String,
        /// Result (Ok data or Err with code/message).
        result: Result<serde_json::Value, ApiQueryError>,
    },
}

/// Error type for API query responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiQueryError {
    /// Numeric error code.
    pub code: i32,
    /// Error message.
    pub message: String,
}

impl DomainEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::DocumentCreated { .. }
            | Self::DocumentEdited { .. }
            | Self::DocumentDeleted { .. } => EventTopic::Documents,
            Self::NotificationCreated { .. }
            | Self::NotificationEdited { .. }
            | Self::NotificationDeleted { .. } => EventTopic::Notifications,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
            Self::ApiQuery { .. } | Self::ApiQueryResponse { .. } => EventTopic::ApiGateway,
        }
    }

    /// Get the originating component.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::DocumentCreated { .. }
            | Self::DocumentEdited { .. }
            | Self::DocumentDeleted { .. }
            | Self::NotificationCreated { .. }
            | Self::NotificationEdited { .. }
            | Self::NotificationDeleted { .. } => DOCUMENT_SERVICE_SOURCE,
            Self::ApiQuery { .. } => API_GATEWAY_SOURCE,
            Self::CriticalError { source, .. } | Self::ApiQueryResponse { source, .. } => source,
        }
    }

    /// The user whose data this event concerns, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::DocumentCreated { user_id, .. }
            | Self::DocumentEdited { user_id, .. }
            | Self::DocumentDeleted { user_id, .. }
            | Self::NotificationCreated { user_id, .. }
            | Self::NotificationEdited { user_id, .. }
            | Self::NotificationDeleted { user_id, .. } => Some(*user_id),
            _ => None,
        }
    }

    /// Whether this event reports a committed mutation.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        self.user_id().is_some()
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Document lifecycle events.
    Documents,
    /// Notification lifecycle events.
    Notifications,
    /// Gateway queries and responses.
    ApiGateway,
    /// Dead Letter Queue for critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source components to include. Empty means all sources.
    pub sources: Vec<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            sources: Vec::new(),
        }
    }

    /// Create a filter for events from specific components.
    #[must_use]
    pub fn from_sources<S: Into<String>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            topics: Vec::new(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &DomainEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match =
            self.sources.is_empty() || self.sources.iter().any(|s| s == event.source());

        topic_match && source_match
    }
}
