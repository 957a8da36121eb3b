//! # Service Configuration
//!
//! Quotas and the per-operation deadline.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default per-user document limit.
pub const DEFAULT_MAX_DOCUMENTS_PER_USER: u64 = 100;

/// Default per-document notification limit.
pub const DEFAULT_MAX_NOTIFICATIONS_PER_DOCUMENT: u64 = 10;

/// Number of documents returned by "latest documents".
pub const LATEST_DOCUMENTS_LIMIT: usize = 5;

/// Default deadline for one operation.
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 1000;

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A quota of zero would reject every create.
    #[error("{0} must be greater than zero")]
    ZeroQuota(&'static str),

    /// A zero deadline would time out every call.
    #[error("operation timeout must be greater than zero")]
    ZeroTimeout,
}

/// Document service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Maximum documents one user may own.
    pub max_documents_per_user: u64,
    /// Maximum notifications one document may carry.
    pub max_notifications_per_document: u64,
    /// Size of the "latest documents" list.
    pub latest_documents_limit: usize,
    /// Deadline for a single operation, in milliseconds.
    pub operation_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_documents_per_user: DEFAULT_MAX_DOCUMENTS_PER_USER,
            max_notifications_per_document: DEFAULT_MAX_NOTIFICATIONS_PER_DOCUMENT,
            latest_documents_limit: LATEST_DOCUMENTS_LIMIT,
            operation_timeout_ms: DEFAULT_OPERATION_TIMEOUT_MS,
        }
    }
}

impl ServiceConfig {
    /// Small quotas so limit behaviour is reachable in a few calls.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            max_documents_per_user: 3,
            max_notifications_per_document: 2,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_documents_per_user(mut self, limit: u64) -> Self {
        self.max_documents_per_user = limit;
        self
    }

    #[must_use]
    pub fn with_max_notifications_per_document(mut self, limit: u64) -> Self {
        self.max_notifications_per_document = limit;
        self
    }

    #[must_use]
    pub fn with_operation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.operation_timeout_ms = timeout_ms;
        self
    }

    /// Deadline as a `Duration`.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Reject values that would make the service unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_documents_per_user == 0 {
            return Err(ConfigError::ZeroQuota("max_documents_per_user"));
        }
        if self.max_notifications_per_document == 0 {
            return Err(ConfigError::ZeroQuota("max_notifications_per_document"));
        }
        if self.latest_documents_limit == 0 {
            return Err(ConfigError::ZeroQuota("latest_documents_limit"));
        }
        if self.operation_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
