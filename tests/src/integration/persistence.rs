//! # Persistent Storage Flows
//!
//! The same service behaviour over RocksDB, plus durability across reopen.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use vr_document_service::{DocumentRequest, DocumentResponse, ErrorKind, ServiceConfig};
    use vr_runtime::adapters::storage::{RocksDbConfig, RocksDbDocumentStore};

    fn open(dir: &TempDir) -> Arc<RocksDbDocumentStore> {
        let config = RocksDbConfig::for_testing(dir.path().to_string_lossy().to_string());
        Arc::new(RocksDbDocumentStore::open(config).unwrap())
    }

    #[tokio::test]
    async fn test_passport_scenario_on_rocksdb() {
        let dir = TempDir::new().unwrap();
        let container = container_with_store(ServiceConfig::default(), open(&dir));
        let handler = &container.handler;
        let u1 = new_user();

        let d1 = created_document(
            handler
                .handle(create_document(&u1, "Passport", Some(1)))
                .await
                .unwrap(),
        );
        handler
            .handle(DocumentRequest::CreateNotification {
                user_id: u1.clone(),
                document_id: d1.clone(),
                date: Some(reminder()),
            })
            .await
            .unwrap();
        handler
            .handle(DocumentRequest::DeleteDocument {
                document_id: d1.clone(),
                user_id: u1.clone(),
            })
            .await
            .unwrap();

        let err = handler
            .handle(DocumentRequest::ListNotifications {
                user_id: u1.clone(),
                document_id: d1,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentNotFound);

        let remaining = handler
            .handle(DocumentRequest::CountDocuments { user_id: u1 })
            .await
            .unwrap();
        assert_eq!(count(remaining), 0);
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let user = new_user();

        let doc = {
            let container = container_with_store(ServiceConfig::default(), open(&dir));
            let doc = created_document(
                container
                    .handler
                    .handle(create_document(&user, "Visa", Some(12)))
                    .await
                    .unwrap(),
            );
            container
                .handler
                .handle(DocumentRequest::CreateNotification {
                    user_id: user.clone(),
                    document_id: doc.clone(),
                    date: Some(reminder()),
                })
                .await
                .unwrap();
            doc
        };

        let container = container_with_store(ServiceConfig::default(), open(&dir));
        let DocumentResponse::Document(details) = container
            .handler
            .handle(DocumentRequest::GetDocument {
                document_id: doc,
                user_id: user,
            })
            .await
            .unwrap()
        else {
            panic!("expected Document response");
        };

        assert_eq!(details.document.title, "Visa");
        assert_eq!(details.notifications.len(), 1);
        assert_eq!(details.notifications[0].date, reminder());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_quota_serialised_on_rocksdb() {
        let dir = TempDir::new().unwrap();
        let container = container_with_store(ServiceConfig::for_testing(), open(&dir));
        let user = new_user();

        let mut tasks = Vec::new();
        for i in 0..12 {
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
        for task in tasks {
            if task.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 3);
    }
}
