//! # Document Service
//!
//! Create, edit, delete and read documents, enforcing the per-user quota.

use super::helpers::{parse_document, parse_user, storage_failure};
use crate::config::ServiceConfig;
use crate::domain::{
    normalize_document, Document, DocumentInput, DocumentType, DocumentUpdate, DomainError,
    QuotaScope, StoreError,
};
use crate::ports::inbound::DocumentApi;
use crate::ports::outbound::{DocumentRepository, InsertOutcome, TimeSource};
use async_trait::async_trait;
use shared_types::DocumentId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Document operations over a [`DocumentRepository`].
pub struct DocumentService<R, T> {
    documents: Arc<R>,
    time_source: Arc<T>,
    config: ServiceConfig,
}

impl<R, T> DocumentService<R, T>
where
    R: DocumentRepository,
    T: TimeSource,
{
    pub fn new(documents: Arc<R>, time_source: Arc<T>, config: ServiceConfig) -> Self {
        Self {
            documents,
            time_source,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[async_trait]
impl<R, T> DocumentApi for DocumentService<R, T>
where
    R: DocumentRepository,
    T: TimeSource,
{
    async fn create(
        &self,
        user_id: &str,
        input: DocumentInput,
    ) -> Result<DocumentId, DomainError> {
        let user_id = parse_user(user_id)?;
        let fields = normalize_document(&input).inspect_err(|e| {
            warn!(user_id = %user_id, error = %e, "[vr-docs] document rejected");
        })?;

        let now = self.time_source.now();
        let document = Document::new(DocumentId::generate(), user_id, fields, now);
        let id = document.id;
        let limit = self.config.max_documents_per_user;

        let outcome = self
            .documents
            .insert_one(document, limit)
            .await
            .map_err(storage_failure("create_document"))?;

        match outcome {
            InsertOutcome::Inserted => {
                info!(user_id = %user_id, document_id = %id, "[vr-docs] document created");
                Ok(id)
            }
            InsertOutcome::QuotaReached => {
                warn!(user_id = %user_id, limit, "[vr-docs] document quota reached");
                Err(DomainError::QuotaExceeded {
                    scope: QuotaScope::DocumentsPerUser,
                    limit,
                })
            }
            InsertOutcome::ParentMissing => Err(storage_failure("create_document")(
                StoreError::Corrupted {
                    message: "document insert reported a missing parent".to_string(),
                },
            )),
        }
    }

    async fn edit(
        &self,
        document_id: &str,
        user_id: &str,
        input: DocumentInput,
    ) -> Result<(), DomainError> {
        let user_id = parse_user(user_id)?;
        let document_id = parse_document(document_id)?;
        let fields = normalize_document(&input).inspect_err(|e| {
            warn!(document_id = %document_id, error = %e, "[vr-docs] edit rejected");
        })?;

        let update = DocumentUpdate {
            id: document_id,
            user_id,
            fields,
            updated_at: self.time_source.now(),
        };
        let matched = self
            .documents
            .update_one(update)
            .await
            .map_err(storage_failure("edit_document"))?;

        if !matched {
            warn!(user_id = %user_id, document_id = %document_id, "[vr-docs] edit matched nothing");
            return Err(DomainError::NotFoundOrForbidden);
        }
        info!(user_id = %user_id, document_id = %document_id, "[vr-docs] document edited");
        Ok(())
    }

    async fn delete(&self, document_id: &str, user_id: &str) -> Result<(), DomainError> {
        let user_id = parse_user(user_id)?;
        let document_id = parse_document(document_id)?;

        let matched = self
            .documents
            .delete_one(document_id, user_id)
            .await
            .map_err(storage_failure("delete_document"))?;

        if !matched {
            warn!(
                user_id = %user_id,
                document_id = %document_id,
                "[vr-docs] delete matched nothing"
            );
            return Err(DomainError::NotFoundOrForbidden);
        }
        info!(user_id = %user_id, document_id = %document_id, "[vr-docs] document deleted");
        Ok(())
    }

    async fn get_one(&self, document_id: &str, user_id: &str) -> Result<Document, DomainError> {
        let user_id = parse_user(user_id)?;
        let document_id = parse_document(document_id)?;

        self.documents
            .find_one(document_id, user_id)
            .await
            .map_err(storage_failure("get_document"))?
            .ok_or(DomainError::NotFoundOrForbidden)
    }

    async fn get_all(&self, user_id: &str) -> Result<Vec<Document>, DomainError> {
        let user_id = parse_user(user_id)?;
        let documents = self
            .documents
            .find_all(user_id)
            .await
            .map_err(storage_failure("list_documents"))?;
        debug!(user_id = %user_id, count = documents.len(), "[vr-docs] listed documents");
        Ok(documents)
    }

    async fn count(&self, user_id: &str) -> Result<u64, DomainError> {
        let user_id = parse_user(user_id)?;
        self.documents
            .count(user_id)
            .await
            .map_err(storage_failure("count_documents"))
    }

    async fn count_by_type(
        &self,
        user_id: &str,
    ) -> Result<BTreeMap<DocumentType, u64>, DomainError> {
        let user_id = parse_user(user_id)?;
        self.documents
            .count_grouped_by_type(user_id)
            .await
            .map_err(storage_failure("count_documents_by_type"))
    }

    async fn find_latest(&self, user_id: &str) -> Result<Vec<Document>, DomainError> {
        let user_id = parse_user(user_id)?;
        self.documents
            .find_latest(user_id, self.config.latest_documents_limit)
            .await
            .map_err(storage_failure("latest_documents"))
    }
}
