//! # Test Fixtures
//!
//! Shared builders for the integration flows.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use shared_bus::{
    ApiQueryError, DomainEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus,
    Subscription, DOCUMENT_SERVICE_SOURCE,
};
use shared_types::{DocumentId, NotificationId, Timestamp, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use vr_document_service::{
    CalendarEntry, Document, DocumentRepository, DocumentRequest, DocumentResponse, DocumentType,
    DocumentUpdate, InMemoryStore, InsertOutcome, ManualTimeSource, Notification,
    NotificationRepository, NotificationUpdate, ServiceConfig, StoreError,
};
use vr_runtime::handlers::{CalendarSink, CalendarSinkError};
use vr_runtime::{RuntimeConfig, ServiceContainer};

/// How long a test waits for an asynchronous effect.
pub const WAIT: Duration = Duration::from_secs(5);

/// Clock origin for every container.
pub fn start() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Passport expiry used throughout.
pub fn expiry() -> Timestamp {
    Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
}

/// Reminder one month before [`expiry`].
pub fn reminder() -> Timestamp {
    Utc.with_ymd_and_hms(2029, 12, 1, 0, 0, 0).unwrap()
}

pub fn new_user() -> String {
    UserId::generate().to_string()
}

/// In-memory container on a deterministic clock.
pub fn container(service: ServiceConfig) -> Arc<ServiceContainer> {
    container_with_store(service, Arc::new(InMemoryStore::new()))
}

/// Container over `store` on a deterministic clock.
pub fn container_with_store<S>(service: ServiceConfig, store: Arc<S>) -> Arc<ServiceContainer>
where
    S: DocumentRepository + NotificationRepository + 'static,
{
    let config = RuntimeConfig {
        service,
        ..RuntimeConfig::default()
    };
    Arc::new(ServiceContainer::with_store_and_clock(
        config,
        store,
        Arc::new(ManualTimeSource::new(start())),
    ))
}

/// Build a create request for `user`.
pub fn create_document(user: &str, title: &str, document_type: Option<i64>) -> DocumentRequest {
    DocumentRequest::CreateDocument {
        user_id: user.to_string(),
        title: title.to_string(),
        document_type,
        description: String::new(),
        expires_at: Some(expiry()),
    }
}

/// Unwrap the id from a `DocumentCreated` response.
pub fn created_document(response: DocumentResponse) -> String {
    match response {
        DocumentResponse::DocumentCreated { document_id } => document_id.to_string(),
        other => panic!("expected DocumentCreated, got {:?}", other),
    }
}

/// Unwrap the id from a `NotificationCreated` response.
pub fn created_notification(response: DocumentResponse) -> String {
    match response {
        DocumentResponse::NotificationCreated { notification_id } => notification_id.to_string(),
        other => panic!("expected NotificationCreated, got {:?}", other),
    }
}

/// Unwrap a `Count` response.
pub fn count(response: DocumentResponse) -> u64 {
    match response {
        DocumentResponse::Count(n) => n,
        other => panic!("expected Count, got {:?}", other),
    }
}

// =============================================================================
// BUS CLIENT
// =============================================================================

/// Gateway stand-in: publishes queries and waits for the matching response.
pub struct BusClient {
    bus: Arc<InMemoryEventBus>,
    responses: Subscription,
    next_id: u64,
}

impl BusClient {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        let responses = bus.subscribe(EventFilter {
            topics: vec![EventTopic::ApiGateway],
            sources: vec![DOCUMENT_SERVICE_SOURCE.to_string()],
        });
        Self {
            bus,
            responses,
            next_id: 0,
        }
    }

    /// Send a raw query.
    pub async fn query(
        &mut self,
        target: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ApiQueryError> {
        self.next_id += 1;
        let correlation_id = format!("q-{}", self.next_id);

        self.bus
            .publish(DomainEvent::ApiQuery {
                correlation_id: correlation_id.clone(),
                target: target.to_string(),
                method: method.to_string(),
                params,
            })
            .await;

        let responses = &mut self.responses;
        tokio::time::timeout(WAIT, async {
            loop {
                match responses.recv().await {
                    Some(DomainEvent::ApiQueryResponse {
                        correlation_id: id,
                        result,
                        ..
                    }) if id == correlation_id => return result,
                    Some(_) => continue,
                    None => panic!("bus closed while waiting for {}", correlation_id),
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("no response to {}", correlation_id))
    }

    /// Send a typed request to the document service and decode the reply.
    pub async fn request(
        &mut self,
        request: DocumentRequest,
    ) -> Result<DocumentResponse, ApiQueryError> {
        let wire = serde_json::to_value(&request).unwrap();
        let value = self
            .query(
                DOCUMENT_SERVICE_SOURCE,
                request.method(),
                wire["params"].clone(),
            )
            .await?;
        Ok(serde_json::from_value(value).unwrap())
    }
}

// =============================================================================
// CALENDAR SINK
// =============================================================================

/// Sink that keeps every delivered calendar.
#[derive(Default)]
pub struct RecordingCalendarSink {
    calls: Mutex<Vec<(UserId, Vec<CalendarEntry>)>>,
}

impl RecordingCalendarSink {
    pub fn calls(&self) -> Vec<(UserId, Vec<CalendarEntry>)> {
        self.calls.lock().clone()
    }

    /// Wait until at least `n` calendars were delivered.
    pub async fn wait_for(&self, n: usize) -> Vec<(UserId, Vec<CalendarEntry>)> {
        tokio::time::timeout(WAIT, async {
            while self.calls.lock().len() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("expected {} calendar deliveries", n));
        self.calls()
    }
}

#[async_trait]
impl CalendarSink for RecordingCalendarSink {
    async fn publish_calendar(
        &self,
        user_id: UserId,
        entries: Vec<CalendarEntry>,
    ) -> Result<(), CalendarSinkError> {
        self.calls.lock().push((user_id, entries));
        Ok(())
    }
}

// =============================================================================
// FAILING STORE
// =============================================================================

/// Store whose backend is unreachable.
#[derive(Debug, Default)]
pub struct FailingStore;

fn unreachable_backend<T>() -> Result<T, StoreError> {
    Err(StoreError::Io {
        message: "connection refused".to_string(),
    })
}

#[async_trait]
impl DocumentRepository for FailingStore {
    async fn insert_one(&self, _: Document, _: u64) -> Result<InsertOutcome, StoreError> {
        unreachable_backend()
    }
    async fn update_one(&self, _: DocumentUpdate) -> Result<bool, StoreError> {
        unreachable_backend()
    }
    async fn delete_one(&self, _: DocumentId, _: UserId) -> Result<bool, StoreError> {
        unreachable_backend()
    }
    async fn find_one(&self, _: DocumentId, _: UserId) -> Result<Option<Document>, StoreError> {
        unreachable_backend()
    }
    async fn find_all(&self, _: UserId) -> Result<Vec<Document>, StoreError> {
        unreachable_backend()
    }
    async fn exists(&self, _: DocumentId, _: UserId) -> Result<bool, StoreError> {
        unreachable_backend()
    }
    async fn count(&self, _: UserId) -> Result<u64, StoreError> {
        unreachable_backend()
    }
    async fn count_grouped_by_type(
        &self,
        _: UserId,
    ) -> Result<BTreeMap<DocumentType, u64>, StoreError> {
        unreachable_backend()
    }
    async fn find_latest(&self, _: UserId, _: usize) -> Result<Vec<Document>, StoreError> {
        unreachable_backend()
    }
}

#[async_trait]
impl NotificationRepository for FailingStore {
    async fn insert_one(&self, _: Notification, _: u64) -> Result<InsertOutcome, StoreError> {
        unreachable_backend()
    }
    async fn update_one(&self, _: NotificationUpdate) -> Result<bool, StoreError> {
        unreachable_backend()
    }
    async fn delete_one(&self, _: NotificationId, _: DocumentId) -> Result<bool, StoreError> {
        unreachable_backend()
    }
    async fn find_all(&self, _: DocumentId) -> Result<Vec<Notification>, StoreError> {
        unreachable_backend()
    }
    async fn count(&self, _: DocumentId) -> Result<u64, StoreError> {
        unreachable_backend()
    }
    async fn count_all(&self, _: UserId) -> Result<u64, StoreError> {
        unreachable_backend()
    }
    async fn find_all_for_user(&self, _: UserId) -> Result<Vec<Notification>, StoreError> {
        unreachable_backend()
    }
}
