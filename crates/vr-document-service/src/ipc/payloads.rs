//! # IPC Payloads
//!
//! Wire shapes of requests and responses.
//!
//! Requests are adjacently tagged: `{"method": "create_document", "params": {...}}`.
//! The same `method`/`params` pair arrives through bus `ApiQuery` events.

use crate::domain::{
    CalendarEntry, Document, DocumentDetails, DocumentInput, DocumentType, DomainError, ErrorKind,
    Notification, UserStatistics,
};
use serde::{Deserialize, Serialize};
use shared_bus::ApiQueryError;
use shared_types::{DocumentId, NotificationId, Timestamp};
use std::collections::BTreeMap;

/// One call into the document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum DocumentRequest {
    CreateDocument {
        user_id: String,
        title: String,
        #[serde(default)]
        document_type: Option<i64>,
        #[serde(default)]
        description: String,
        #[serde(default)]
        expires_at: Option<Timestamp>,
    },
    EditDocument {
        document_id: String,
        user_id: String,
        title: String,
        #[serde(default)]
        document_type: Option<i64>,
        #[serde(default)]
        description: String,
        #[serde(default)]
        expires_at: Option<Timestamp>,
    },
    DeleteDocument {
        document_id: String,
        user_id: String,
    },
    GetDocument {
        document_id: String,
        user_id: String,
    },
    ListDocuments {
        user_id: String,
    },
    CountDocuments {
        user_id: String,
    },
    CountDocumentsByType {
        user_id: String,
    },
    LatestDocuments {
        user_id: String,
    },
    UserStatistics {
        user_id: String,
    },
    CreateNotification {
        user_id: String,
        document_id: String,
        #[serde(default)]
        date: Option<Timestamp>,
    },
    EditNotification {
        notification_id: String,
        user_id: String,
        document_id: String,
        #[serde(default)]
        date: Option<Timestamp>,
    },
    DeleteNotification {
        notification_id: String,
        user_id: String,
        document_id: String,
    },
    ListNotifications {
        user_id: String,
        document_id: String,
    },
    CountNotifications {
        user_id: String,
        document_id: String,
    },
    CountAllNotifications {
        user_id: String,
    },
    ListUserNotifications {
        user_id: String,
    },
    UserCalendar {
        user_id: String,
    },
}

impl DocumentRequest {
    /// Every wire method name, in declaration order.
    pub const METHODS: &'static [&'static str] = &[
        "create_document",
        "edit_document",
        "delete_document",
        "get_document",
        "list_documents",
        "count_documents",
        "count_documents_by_type",
        "latest_documents",
        "user_statistics",
        "create_notification",
        "edit_notification",
        "delete_notification",
        "list_notifications",
        "count_notifications",
        "count_all_notifications",
        "list_user_notifications",
        "user_calendar",
    ];

    /// Wire name of the method.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateDocument { .. } => "create_document",
            Self::EditDocument { .. } => "edit_document",
            Self::DeleteDocument { .. } => "delete_document",
            Self::GetDocument { .. } => "get_document",
            Self::ListDocuments { .. } => "list_documents",
            Self::CountDocuments { .. } => "count_documents",
            Self::CountDocumentsByType { .. } => "count_documents_by_type",
            Self::LatestDocuments { .. } => "latest_documents",
            Self::UserStatistics { .. } => "user_statistics",
            Self::CreateNotification { .. } => "create_notification",
            Self::EditNotification { .. } => "edit_notification",
            Self::DeleteNotification { .. } => "delete_notification",
            Self::ListNotifications { .. } => "list_notifications",
            Self::CountNotifications { .. } => "count_notifications",
            Self::CountAllNotifications { .. } => "count_all_notifications",
            Self::ListUserNotifications { .. } => "list_user_notifications",
            Self::UserCalendar { .. } => "user_calendar",
        }
    }

    /// Whether a successful call changes stored state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateDocument { .. }
                | Self::EditDocument { .. }
                | Self::DeleteDocument { .. }
                | Self::CreateNotification { .. }
                | Self::EditNotification { .. }
                | Self::DeleteNotification { .. }
        )
    }

    /// Rebuild a request from a bus query's method name and parameters.
    pub fn from_query(method: &str, params: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::json!({ "method": method, "params": params }))
    }
}

/// Assemble a [`DocumentInput`] from flattened request fields.
pub(crate) fn document_input(
    title: String,
    document_type: Option<i64>,
    description: String,
    expires_at: Option<Timestamp>,
) -> DocumentInput {
    DocumentInput {
        title,
        document_type,
        description,
        expires_at,
    }
}

/// Count of one document type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub document_type: DocumentType,
    pub label: String,
    pub count: u64,
}

impl TypeCount {
    /// Flatten a per-type map, ordered by type code.
    #[must_use]
    pub fn from_map(counts: BTreeMap<DocumentType, u64>) -> Vec<Self> {
        counts
            .into_iter()
            .map(|(document_type, count)| Self {
                document_type,
                label: document_type.label().to_string(),
                count,
            })
            .collect()
    }
}

/// Successful result of a [`DocumentRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DocumentResponse {
    DocumentCreated { document_id: DocumentId },
    NotificationCreated { notification_id: NotificationId },
    /// Mutation without a payload.
    Done,
    Document(DocumentDetails),
    Documents(Vec<Document>),
    Count(u64),
    TypeCounts(Vec<TypeCount>),
    Statistics(UserStatistics),
    Notifications(Vec<Notification>),
    Calendar(Vec<CalendarEntry>),
}

/// Failed result of a [`DocumentRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DomainError> for ErrorPayload {
    fn from(err: &DomainError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ErrorPayload> for ApiQueryError {
    fn from(payload: ErrorPayload) -> Self {
        Self {
            code: payload.kind.code(),
            message: payload.message,
        }
    }
}
