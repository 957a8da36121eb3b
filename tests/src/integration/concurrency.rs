//! # Concurrent Callers
//!
//! Quotas are hard limits and the cascade leaves no orphans, even when
//! many requests race on the same user or document.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use std::sync::Arc;
    use vr_document_service::{
        DocumentRequest, DocumentResponse, ErrorKind, InMemoryStore, ServiceConfig,
    };

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_document_quota_holds_under_concurrent_creates() {
        let container = container(ServiceConfig::for_testing());
        let user = new_user();

        let mut tasks = Vec::new();
        for i in 0..16 {
            let container = Arc::clone(&container);
            let user = user.clone();
            tasks.push(tokio::spawn(async move {
                container
                    .handler
                    .handle(create_document(&user, &format!("Doc {}", i), None))
                    .await
            }));
        }

        let mut created = 0;
        let mut rejected = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => {
                    assert_eq!(e.kind, ErrorKind::QuotaExceeded);
                    rejected += 1;
                }
            }
        }

        assert_eq!(created, 3);
        assert_eq!(rejected, 13);
        assert_eq!(container.documents.count(&user).await.unwrap(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_notification_quota_holds_under_concurrent_creates() {
        let container = container(ServiceConfig::for_testing());
        let user = new_user();
        let doc = created_document(
            container
                .handler
                .handle(create_document(&user, "Passport", Some(1)))
                .await
                .unwrap(),
        );

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let container = Arc::clone(&container);
            let request = DocumentRequest::CreateNotification {
                user_id: user.clone(),
                document_id: doc.clone(),
                date: Some(reminder()),
            };
            tasks.push(tokio::spawn(async move {
                container.handler.handle(request).await
            }));
        }

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 2);
        assert_eq!(
            container.notifications.count(&user, &doc).await.unwrap(),
            2
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_delete_racing_notification_creates_leaves_no_orphans() {
        let store = Arc::new(InMemoryStore::new());
        let config = ServiceConfig::default().with_max_notifications_per_document(100);
        let container = container_with_store(config, Arc::clone(&store));

        for _ in 0..10 {
            let user = new_user();
            let doc = created_document(
                container
                    .handler
                    .handle(create_document(&user, "Passport", Some(1)))
                    .await
                    .unwrap(),
            );

            let mut writers = Vec::new();
            for _ in 0..8 {
                let container = Arc::clone(&container);
                let request = DocumentRequest::CreateNotification {
                    user_id: user.clone(),
                    document_id: doc.clone(),
                    date: Some(reminder()),
                };
                writers.push(tokio::spawn(async move {
                    container.handler.handle(request).await
                }));
            }

            let deleted = container
                .handler
                .handle(DocumentRequest::DeleteDocument {
                    document_id: doc.clone(),
                    user_id: user.clone(),
                })
                .await
                .unwrap();
            assert_eq!(deleted, DocumentResponse::Done);

            for writer in writers {
                if let Err(e) = writer.await.unwrap() {
                    assert_eq!(e.kind, ErrorKind::DocumentNotFound);
                }
            }

            assert_eq!(container.notifications.count_all(&user).await.unwrap(), 0);
        }

        assert_eq!(store.notification_rows(), 0);
    }
}
