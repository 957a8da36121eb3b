//! # Request Handler Flows
//!
//! Drives the document service through `DocumentServiceHandler`, the way a
//! transport would, and checks the data properties end to end.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use proptest::prelude::*;
    use shared_bus::{DomainEvent, EventFilter, EventTopic};
    use std::time::Duration;
    use vr_document_service::{
        DocumentRequest, DocumentResponse, DocumentType, ErrorKind, ServiceConfig,
    };

    // =========================================================================
    // PASSPORT SCENARIO
    // =========================================================================

    #[tokio::test]
    async fn test_passport_lifecycle() {
        let container = container(ServiceConfig::default());
        let handler = &container.handler;
        let u1 = new_user();

        let d1 = created_document(
            handler
                .handle(create_document(&u1, "Passport", Some(1)))
                .await
                .unwrap(),
        );

        created_notification(
            handler
                .handle(DocumentRequest::CreateNotification {
                    user_id: u1.clone(),
                    document_id: d1.clone(),
                    date: Some(reminder()),
                })
                .await
                .unwrap(),
        );

        let response = handler
            .handle(DocumentRequest::DeleteDocument {
                document_id: d1.clone(),
                user_id: u1.clone(),
            })
            .await
            .unwrap();
        assert_eq!(response, DocumentResponse::Done);

        let err = handler
            .handle(DocumentRequest::ListNotifications {
                user_id: u1.clone(),
                document_id: d1.clone(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DocumentNotFound);

        let remaining = handler
            .handle(DocumentRequest::CountDocuments { user_id: u1.clone() })
            .await
            .unwrap();
        assert_eq!(count(remaining), 0);

        let reminders = handler
            .handle(DocumentRequest::CountAllNotifications { user_id: u1 })
            .await
            .unwrap();
        assert_eq!(count(reminders), 0);
    }

    // =========================================================================
    // QUOTAS
    // =========================================================================

    #[tokio::test]
    async fn test_document_quota_through_handler() {
        let container = container(ServiceConfig::for_testing());
        let handler = &container.handler;
        let user = new_user();

        for expected in 1..=3 {
            handler
                .handle(create_document(&user, "Doc", None))
                .await
                .unwrap();
            let n = count(
                handler
                    .handle(DocumentRequest::CountDocuments {
                        user_id: user.clone(),
                    })
                    .await
                    .unwrap(),
            );
            assert_eq!(n, expected);
        }

        let err = handler
            .handle(create_document(&user, "One too many", None))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);

        let n = count(
            handler
                .handle(DocumentRequest::CountDocuments { user_id: user })
                .await
                .unwrap(),
        );
        assert_eq!(n, 3);
    }

    // =========================================================================
    // OWNERSHIP
    // =========================================================================

    #[tokio::test]
    async fn test_foreign_user_cannot_touch_document() {
        let container = container(ServiceConfig::default());
        let handler = &container.handler;
        let owner = new_user();
        let intruder = new_user();

        let doc = created_document(
            handler
                .handle(create_document(&owner, "Passport", Some(1)))
                .await
                .unwrap(),
        );

        let edit = handler
            .handle(DocumentRequest::EditDocument {
                document_id: doc.clone(),
                user_id: intruder.clone(),
                title: "Hijacked".into(),
                document_type: None,
                description: String::new(),
                expires_at: Some(expiry()),
            })
            .await
            .unwrap_err();
        assert_eq!(edit.kind, ErrorKind::NotFoundOrForbidden);

        let delete = handler
            .handle(DocumentRequest::DeleteDocument {
                document_id: doc.clone(),
                user_id: intruder.clone(),
            })
            .await
            .unwrap_err();
        assert_eq!(delete.kind, ErrorKind::NotFoundOrForbidden);

        let read = handler
            .handle(DocumentRequest::GetDocument {
                document_id: doc.clone(),
                user_id: intruder.clone(),
            })
            .await
            .unwrap_err();
        assert_eq!(read.kind, ErrorKind::NotFoundOrForbidden);

        let attach = handler
            .handle(DocumentRequest::CreateNotification {
                user_id: intruder,
                document_id: doc.clone(),
                date: Some(reminder()),
            })
            .await
            .unwrap_err();
        assert_eq!(attach.kind, ErrorKind::DocumentNotFound);

        match handler
            .handle(DocumentRequest::GetDocument {
                document_id: doc,
                user_id: owner,
            })
            .await
            .unwrap()
        {
            DocumentResponse::Document(details) => {
                assert_eq!(details.document.title, "Passport");
                assert!(details.notifications.is_empty());
            }
            other => panic!("expected Document, got {:?}", other),
        }
    }

    // =========================================================================
    // NORMALISATION
    // =========================================================================

    #[tokio::test]
    async fn test_reserved_characters_escaped_once() {
        let container = container(ServiceConfig::default());
        let handler = &container.handler;
        let user = new_user();

        let doc = created_document(
            handler
                .handle(DocumentRequest::CreateDocument {
                    user_id: user.clone(),
                    title: "  <Passport> &lt;copy&gt;  ".into(),
                    document_type: Some(1),
                    description: "renew (urgent); see a/b".into(),
                    expires_at: Some(expiry()),
                })
                .await
                .unwrap(),
        );

        let DocumentResponse::Document(details) = handler
            .handle(DocumentRequest::GetDocument {
                document_id: doc,
                user_id: user,
            })
            .await
            .unwrap()
        else {
            panic!("expected Document response");
        };

        assert_eq!(details.document.title, "&lt;Passport&gt; &lt;copy&gt;");
        assert_eq!(
            details.document.description,
            "renew &#40;urgent&#41;&#59; see a&#47;b"
        );
    }

    // =========================================================================
    // AGGREGATES
    // =========================================================================

    #[tokio::test]
    async fn test_latest_documents_newest_first() {
        let container = container(ServiceConfig::default());
        let handler = &container.handler;
        let user = new_user();

        let mut ids = Vec::new();
        for i in 0..7 {
            ids.push(created_document(
                handler
                    .handle(create_document(&user, &format!("Doc {}", i), None))
                    .await
                    .unwrap(),
            ));
        }

        let DocumentResponse::Documents(latest) = handler
            .handle(DocumentRequest::LatestDocuments { user_id: user })
            .await
            .unwrap()
        else {
            panic!("expected Documents response");
        };

        let latest_ids: Vec<String> = latest.iter().map(|d| d.id.to_string()).collect();
        let expected: Vec<String> = ids.iter().rev().take(5).cloned().collect();
        assert_eq!(latest_ids, expected);
    }

    #[tokio::test]
    async fn test_statistics_and_calendar() {
        let container = container(ServiceConfig::default());
        let handler = &container.handler;
        let user = new_user();

        let passport = created_document(
            handler
                .handle(create_document(&user, "Passport", Some(1)))
                .await
                .unwrap(),
        );
        let visa = created_document(
            handler
                .handle(create_document(&user, "Visa", Some(12)))
                .await
                .unwrap(),
        );
        for (document_id, date) in [
            (&visa, reminder()),
            (&passport, reminder() - chrono::Duration::days(7)),
        ] {
            handler
                .handle(DocumentRequest::CreateNotification {
                    user_id: user.clone(),
                    document_id: document_id.clone(),
                    date: Some(date),
                })
                .await
                .unwrap();
        }

        let DocumentResponse::Statistics(stats) = handler
            .handle(DocumentRequest::UserStatistics {
                user_id: user.clone(),
            })
            .await
            .unwrap()
        else {
            panic!("expected Statistics response");
        };
        assert_eq!(stats.total, 2);
        assert_eq!(stats.total_notifications, 2);
        assert_eq!(stats.by_type.get(&DocumentType::Visa), Some(&1));
        assert_eq!(stats.latest.len(), 2);

        let DocumentResponse::Calendar(entries) = handler
            .handle(DocumentRequest::UserCalendar { user_id: user })
            .await
            .unwrap()
        else {
            panic!("expected Calendar response");
        };
        let titles: Vec<&str> = entries.iter().map(|e| e.document_title.as_str()).collect();
        assert_eq!(titles, vec!["Passport", "Visa"]);
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[tokio::test]
    async fn test_mutations_publish_events_reads_do_not() {
        let container = container(ServiceConfig::default());
        let mut events = container.event_bus.subscribe(EventFilter::topics(vec![
            EventTopic::Documents,
            EventTopic::Notifications,
        ]));
        let handler = &container.handler;
        let user = new_user();

        let doc = created_document(
            handler
                .handle(create_document(&user, "Passport", Some(1)))
                .await
                .unwrap(),
        );
        handler
            .handle(DocumentRequest::ListDocuments {
                user_id: user.clone(),
            })
            .await
            .unwrap();
        handler
            .handle(DocumentRequest::DeleteDocument {
                document_id: doc.clone(),
                user_id: user.clone(),
            })
            .await
            .unwrap();

        let first = tokio::time::timeout(WAIT, events.recv()).await.unwrap();
        let second = tokio::time::timeout(WAIT, events.recv()).await.unwrap();
        let mut kinds = vec![first, second]
            .into_iter()
            .map(|e| match e {
                Some(DomainEvent::DocumentCreated { document_id, .. }) => {
                    assert_eq!(document_id.to_string(), doc);
                    "created"
                }
                Some(DomainEvent::DocumentDeleted { document_id, .. }) => {
                    assert_eq!(document_id.to_string(), doc);
                    "deleted"
                }
                other => panic!("unexpected event {:?}", other),
            })
            .collect::<Vec<_>>();
        kinds.sort_unstable();
        assert_eq!(kinds, vec!["created", "deleted"]);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(events.try_recv().unwrap().is_none());
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_count_by_type_sums_to_count(codes in prop::collection::vec(
            prop::sample::select(
                DocumentType::ALL.iter().map(|t| i64::from(t.code())).collect::<Vec<_>>(),
            ),
            0..12,
        )) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            let (total, sum) = runtime.block_on(async {
                let container = container(ServiceConfig::default());
                let handler = &container.handler;
                let user = new_user();

                for code in &codes {
                    handler
                        .handle(create_document(&user, "Doc", Some(*code)))
                        .await
                        .unwrap();
                }

                let total = count(
                    handler
                        .handle(DocumentRequest::CountDocuments { user_id: user.clone() })
                        .await
                        .unwrap(),
                );
                let DocumentResponse::TypeCounts(buckets) = handler
                    .handle(DocumentRequest::CountDocumentsByType { user_id: user })
                    .await
                    .unwrap()
                else {
                    panic!("expected TypeCounts response");
                };
                (total, buckets.iter().map(|b| b.count).sum::<u64>())
            });

            prop_assert_eq!(total, codes.len() as u64);
            prop_assert_eq!(sum, total);
        }
    }
}
