//! # Gateway Queries Through the Runtime
//!
//! Starts a `ValidityRuntime` and talks to it only through `ApiQuery`
//! events, checking the responses and the fire-and-forget side effects.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use serde_json::json;
    use shared_bus::{DomainEvent, EventFilter, EventTopic, DOCUMENT_SERVICE_SOURCE};
    use shared_types::UserId;
    use std::sync::Arc;
    use vr_document_service::{DocumentRequest, DocumentResponse, ErrorKind, ServiceConfig};
    use vr_runtime::handlers::api_query::{INVALID_PARAMS, METHOD_NOT_FOUND};
    use vr_runtime::ValidityRuntime;

    fn runtime_with_sink(
        service: ServiceConfig,
    ) -> (ValidityRuntime, Arc<RecordingCalendarSink>, BusClient) {
        let container = container(service);
        let sink = Arc::new(RecordingCalendarSink::default());
        let runtime = ValidityRuntime::with_container(Arc::clone(&container), sink.clone());
        runtime.start();
        let client = BusClient::new(Arc::clone(&container.event_bus));
        (runtime, sink, client)
    }

    #[tokio::test]
    async fn test_passport_scenario_over_bus() {
        let (runtime, sink, mut client) = runtime_with_sink(ServiceConfig::default());
        let u1 = new_user();

        let d1 = created_document(
            client
                .request(create_document(&u1, "Passport", Some(1)))
                .await
                .unwrap(),
        );
        client
            .request(DocumentRequest::CreateNotification {
                user_id: u1.clone(),
                document_id: d1.clone(),
                date: Some(reminder()),
            })
            .await
            .unwrap();

        client
            .request(DocumentRequest::DeleteDocument {
                document_id: d1.clone(),
                user_id: u1.clone(),
            })
            .await
            .unwrap();

        let err = client
            .request(DocumentRequest::ListNotifications {
                user_id: u1.clone(),
                document_id: d1,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorKind::DocumentNotFound.code());

        let remaining = client
            .request(DocumentRequest::CountDocuments { user_id: u1.clone() })
            .await
            .unwrap();
        assert_eq!(count(remaining), 0);

        // One regeneration per mutation; the last one runs after the delete.
        let user_id = UserId::parse(&u1).unwrap();
        let calls = sink.wait_for(3).await;
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(id, _)| *id == user_id));
        assert!(calls[2].1.is_empty());

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_routing_errors() {
        let (runtime, _sink, mut client) = runtime_with_sink(ServiceConfig::default());

        let unknown_target = client
            .query("qc-02-block-storage", "count_documents", json!({}))
            .await
            .unwrap_err();
        assert_eq!(unknown_target.code, METHOD_NOT_FOUND);

        let unknown_method = client
            .query(DOCUMENT_SERVICE_SOURCE, "drop_tables", json!({}))
            .await
            .unwrap_err();
        assert_eq!(unknown_method.code, METHOD_NOT_FOUND);

        let bad_params = client
            .query(
                DOCUMENT_SERVICE_SOURCE,
                "create_document",
                json!({"user_id": new_user()}),
            )
            .await
            .unwrap_err();
        assert_eq!(bad_params.code, INVALID_PARAMS);

        let invalid_user = client
            .query(
                DOCUMENT_SERVICE_SOURCE,
                "list_documents",
                json!({"user_id": "42"}),
            )
            .await
            .unwrap_err();
        assert_eq!(invalid_user.code, ErrorKind::InvalidUserId.code());

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_validation_failure_over_bus() {
        let (runtime, sink, mut client) = runtime_with_sink(ServiceConfig::default());
        let user = new_user();

        let err = client
            .request(DocumentRequest::CreateDocument {
                user_id: user.clone(),
                title: "x".repeat(101),
                document_type: None,
                description: String::new(),
                expires_at: Some(expiry()),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorKind::ValidationFailed.code());

        let unknown_type = client
            .request(create_document(&user, "Passport", Some(99)))
            .await
            .unwrap_err();
        assert_eq!(unknown_type.code, ErrorKind::ValidationFailed.code());

        let listed = client
            .request(DocumentRequest::ListDocuments { user_id: user })
            .await
            .unwrap();
        assert_eq!(listed, DocumentResponse::Documents(Vec::new()));
        assert!(sink.calls().is_empty());

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_storage_failure_raises_critical_error() {
        let container = container_with_store(ServiceConfig::default(), Arc::new(FailingStore));
        let runtime = ValidityRuntime::with_container(
            Arc::clone(&container),
            Arc::new(RecordingCalendarSink::default()),
        );
        let mut dlq = container
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::DeadLetterQueue]));
        runtime.start();
        let mut client = BusClient::new(Arc::clone(&container.event_bus));

        let err = client
            .request(DocumentRequest::CountDocuments {
                user_id: new_user(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorKind::InternalStorage.code());

        match tokio::time::timeout(WAIT, dlq.recv()).await.unwrap() {
            Some(DomainEvent::CriticalError { source, error }) => {
                assert_eq!(source, DOCUMENT_SERVICE_SOURCE);
                assert!(error.contains("connection refused"));
            }
            other => panic!("expected CriticalError, got {:?}", other),
        }

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_query_handling() {
        let (runtime, _sink, _client) = runtime_with_sink(ServiceConfig::default());
        let container = runtime.container();

        runtime.shutdown().await;
        assert_eq!(runtime.running_tasks(), 0);
        assert_eq!(container.event_bus.subscriber_count(), 1);
    }
}
