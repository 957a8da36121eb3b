//! # API Query Handler
//!
//! Listens for `ApiQuery` events from the gateway, routes them to the
//! document service and publishes an `ApiQueryResponse` carrying the same
//! correlation id.
//!
//! ## Query Flow
//!
//! ```text
//! API Gateway
//!       │
//!       │ publishes ApiQuery { target: "vr-document-service", method, params }
//!       ▼
//! ┌─────────────────┐
//! │  Event Bus      │
//! └─────────────────┘
//!       │
//!       ▼
//! ┌─────────────────────────────────────┐
//! │  ApiQueryHandler                    │
//! │  - Routes by target component       │
//! │  - Rebuilds the DocumentRequest     │
//! │  - Runs it under the deadline       │
//! └─────────────────────────────────────┘
//!       │
//!       │ publishes ApiQueryResponse
//!       ▼
//! API Gateway
//! ```
//!
//! ## Error Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | -32601 | Unknown target or method |
//! | -32602 | Parameters do not fit the method |
//! | -32603 | Response could not be encoded |
//! | -32001..-32009 | Domain error kinds |

use crate::container::ServiceContainer;
use shared_bus::{
    ApiQueryError, DomainEvent, EventFilter, EventPublisher, EventTopic, Subscription,
    API_GATEWAY_SOURCE, DOCUMENT_SERVICE_SOURCE,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use vr_document_service::{DocumentRequest, ErrorKind};

/// Unknown target or method.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Parameters rejected before reaching the service.
pub const INVALID_PARAMS: i32 = -32602;
/// Response serialization failed.
pub const INTERNAL_ERROR: i32 = -32603;

/// Handler that answers gateway queries addressed to the document service.
pub struct ApiQueryHandler {
    container: Arc<ServiceContainer>,
    subscription: Subscription,
}

impl ApiQueryHandler {
    /// Subscribe to gateway queries.
    ///
    /// Only events published by the gateway are received, so the handler
    /// never sees its own responses.
    pub fn new(container: Arc<ServiceContainer>) -> Self {
        let filter = EventFilter {
            topics: vec![EventTopic::ApiGateway],
            sources: vec![API_GATEWAY_SOURCE.to_string()],
        };
        let subscription = container.event_bus.subscribe(filter);

        Self {
            container,
            subscription,
        }
    }

    /// Process queries until the bus closes.
    ///
    /// Each query runs on its own task so a slow call does not hold up the
    /// ones queued behind it.
    pub async fn run(mut self) {
        info!("[vr-runtime] API query handler started");

        loop {
            match self.subscription.recv().await {
                Some(DomainEvent::ApiQuery {
                    correlation_id,
                    target,
                    method,
                    params,
                }) => {
                    debug!(
                        correlation_id = %correlation_id,
                        target = %target,
                        method = %method,
                        "[vr-runtime] Received API query"
                    );
                    let container = Arc::clone(&self.container);
                    tokio::spawn(async move {
                        respond(&container, correlation_id, &target, &method, &params).await;
                    });
                }
                Some(other) => {
                    warn!("[vr-runtime] Unexpected event on query channel: {:?}", other);
                }
                None => {
                    error!("[vr-runtime] Event bus closed, API query handler stopping");
                    break;
                }
            }
        }
    }
}

async fn respond(
    container: &ServiceContainer,
    correlation_id: String,
    target: &str,
    method: &str,
    params: &serde_json::Value,
) {
    let result = process_query(container, target, method, params).await;

    if let Err(err) = &result {
        if err.code == ErrorKind::InternalStorage.code() {
            container
                .event_bus
                .publish(DomainEvent::CriticalError {
                    source: DOCUMENT_SERVICE_SOURCE.to_string(),
                    error: err.message.clone(),
                })
                .await;
        }
    }

    let response = DomainEvent::ApiQueryResponse {
        correlation_id: correlation_id.clone(),
        source: DOCUMENT_SERVICE_SOURCE.to_string(),
        result,
    };
    let receivers = container.event_bus.publish(response).await;
    debug!(
        correlation_id = %correlation_id,
        receivers,
        "[vr-runtime] Published API query response"
    );
}

/// Route one query and produce its JSON result.
pub async fn process_query(
    container: &ServiceContainer,
    target: &str,
    method: &str,
    params: &serde_json::Value,
) -> Result<serde_json::Value, ApiQueryError> {
    if target != DOCUMENT_SERVICE_SOURCE {
        warn!(target = %target, "[vr-runtime] Unknown query target");
        return Err(ApiQueryError {
            code: METHOD_NOT_FOUND,
            message: format!("Unknown target component: {}", target),
        });
    }

    if !DocumentRequest::METHODS.contains(&method) {
        warn!(method = %method, "[vr-runtime] Unknown document service method");
        return Err(ApiQueryError {
            code: METHOD_NOT_FOUND,
            message: format!("Unknown method: {}", method),
        });
    }

    let request = DocumentRequest::from_query(method, params).map_err(|e| ApiQueryError {
        code: INVALID_PARAMS,
        message: format!("Invalid params for {}: {}", method, e),
    })?;

    let response = container
        .handler
        .handle(request)
        .await
        .map_err(ApiQueryError::from)?;

    serde_json::to_value(&response).map_err(|e| ApiQueryError {
        code: INTERNAL_ERROR,
        message: format!("Failed to encode response: {}", e),
    })
}
