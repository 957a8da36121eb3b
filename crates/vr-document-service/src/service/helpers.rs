//! Identifier parsing and storage-error mapping shared by both services.

use crate::domain::{DomainError, StoreError};
use shared_types::{DocumentId, NotificationId, UserId};
use tracing::{error, warn};

pub(super) fn parse_user(input: &str) -> Result<UserId, DomainError> {
    UserId::parse(input).map_err(|e| {
        warn!(error = %e, "[vr-docs] rejected user id");
        DomainError::InvalidUserId(e)
    })
}

pub(super) fn parse_document(input: &str) -> Result<DocumentId, DomainError> {
    DocumentId::parse(input).map_err(|e| {
        warn!(error = %e, "[vr-docs] rejected document id");
        DomainError::InvalidDocumentId(e)
    })
}

pub(super) fn parse_notification(input: &str) -> Result<NotificationId, DomainError> {
    NotificationId::parse(input).map_err(|e| {
        warn!(error = %e, "[vr-docs] rejected notification id");
        DomainError::InvalidNotificationId(e)
    })
}

/// Log a backing-store failure and pass it through unchanged.
pub(super) fn storage_failure(operation: &'static str) -> impl FnOnce(StoreError) -> DomainError {
    move |e| {
        error!(operation, error = %e, "[vr-docs] storage failure");
        DomainError::InternalStorage(e)
    }
}
