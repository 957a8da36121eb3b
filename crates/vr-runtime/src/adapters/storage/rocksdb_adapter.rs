//! # RocksDB Storage Adapter
//!
//! Persistent implementation of [`DocumentRepository`] and
//! [`NotificationRepository`].
//!
//! ## Column Families
//!
//! - `documents` - `user_id ++ document_id` -> bincode([`StoredDocument`])
//! - `notifications` - `document_id ++ notification_id` -> bincode([`Notification`])
//! - `metadata` - insertion counter
//!
//! Keys are prefixed by the owning scope, so "all documents of a user" and
//! "all notifications of a document" are prefix scans.
//!
//! ## Atomicity
//!
//! Readers take the read side of the database lock. Every write holds the
//! write side across its check and its `WriteBatch`, so quota checks,
//! parent re-checks and cascading deletes cannot interleave.
//!
//! ## Blocking
//!
//! Each operation runs on tokio's blocking pool, so a slow fsync or a
//! contended lock never stalls an executor thread and the caller's deadline
//! can fire. A timed-out write is abandoned, not cancelled: it may still
//! commit after the caller has been told it timed out.

use async_trait::async_trait;
use parking_lot::RwLock;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{DocumentId, NotificationId, UserId};
use std::collections::BTreeMap;
use std::sync::Arc;
use vr_document_service::{
    Document, DocumentRepository, DocumentType, DocumentUpdate, InsertOutcome, Notification,
    NotificationRepository, NotificationUpdate, StoreError,
};

/// Column family names
pub const CF_DOCUMENTS: &str = "documents";
pub const CF_NOTIFICATIONS: &str = "notifications";
pub const CF_METADATA: &str = "metadata";

/// All column families used by the store
pub const COLUMN_FAMILIES: &[&str] = &[CF_DOCUMENTS, CF_NOTIFICATIONS, CF_METADATA];

const NEXT_SEQ_KEY: &[u8] = b"next_seq";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// Block cache size in bytes (default: 64MB)
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/validity".to_string(),
            block_cache_size: 64 * 1024 * 1024,  // 64MB
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 4 * 1024 * 1024,  // 4MB
            write_buffer_size: 2 * 1024 * 1024, // 2MB
            sync_writes: false,
        }
    }
}

/// Document row plus its insertion sequence (tie-break for "latest").
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    document: Document,
    seq: u64,
}

/// RocksDB-backed document and notification store
pub struct RocksDbDocumentStore {
    database: Arc<Database>,
}

/// The open database and its write options, shared with blocking tasks.
struct Database {
    db: RwLock<DB>,
    sync_writes: bool,
}

impl Database {
    fn commit(&self, db: &DB, batch: WriteBatch) -> Result<(), StoreError> {
        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.sync_writes);
        db.write_opt(batch, &write_opts)
            .map_err(io_error("batch write"))
    }
}

impl RocksDbDocumentStore {
    /// Open or create the database
    pub fn open(config: RocksDbConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| {
                let mut cf_opts = Options::default();
                cf_opts.set_compression_type(rocksdb::DBCompressionType::Snappy);
                ColumnFamilyDescriptor::new(*name, cf_opts)
            })
            .collect();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors).map_err(|e| {
            StoreError::Io {
                message: format!("Failed to open RocksDB: {}", e),
            }
        })?;

        Ok(Self {
            database: Arc::new(Database {
                db: RwLock::new(db),
                sync_writes: config.sync_writes,
            }),
        })
    }

    /// Run `operation` against the database on the blocking pool.
    async fn blocking<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let database = Arc::clone(&self.database);
        tokio::task::spawn_blocking(move || operation(&database))
            .await
            .map_err(|e| StoreError::Io {
                message: format!("RocksDB task failed: {}", e),
            })?
    }
}

fn scoped_key(scope: &[u8; 16], id: &[u8; 16]) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(scope);
    key[16..].copy_from_slice(id);
    key
}

fn document_key(owner: UserId, id: DocumentId) -> [u8; 32] {
    scoped_key(owner.as_bytes(), id.as_bytes())
}

fn notification_key(document_id: DocumentId, id: NotificationId) -> [u8; 32] {
    scoped_key(document_id.as_bytes(), id.as_bytes())
}

fn column<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily, StoreError> {
    db.cf_handle(name).ok_or_else(|| StoreError::Corrupted {
        message: format!("missing column family: {}", name),
    })
}

fn io_error(operation: &'static str) -> impl FnOnce(rocksdb::Error) -> StoreError {
    move |e| StoreError::Io {
        message: format!("RocksDB {} failed: {}", operation, e),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

fn prefix_scan(
    db: &DB,
    cf: &ColumnFamily,
    prefix: &[u8],
) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>, StoreError> {
    let mut results = Vec::new();
    for item in db.iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward)) {
        let (key, value) = item.map_err(io_error("scan"))?;
        if !key.starts_with(prefix) {
            break;
        }
        results.push((key, value));
    }
    Ok(results)
}

fn owned_documents(db: &DB, owner: UserId) -> Result<Vec<StoredDocument>, StoreError> {
    let cf = column(db, CF_DOCUMENTS)?;
    prefix_scan(db, cf, owner.as_bytes())?
        .iter()
        .map(|(_, value)| decode(value))
        .collect()
}

fn children(db: &DB, document_id: DocumentId) -> Result<Vec<Notification>, StoreError> {
    let cf = column(db, CF_NOTIFICATIONS)?;
    prefix_scan(db, cf, document_id.as_bytes())?
        .iter()
        .map(|(_, value)| decode(value))
        .collect()
}

fn child_count(db: &DB, document_id: DocumentId) -> Result<u64, StoreError> {
    let cf = column(db, CF_NOTIFICATIONS)?;
    Ok(prefix_scan(db, cf, document_id.as_bytes())?.len() as u64)
}

fn key_exists(db: &DB, cf_name: &str, key: &[u8]) -> Result<bool, StoreError> {
    let cf = column(db, cf_name)?;
    db.get_pinned_cf(cf, key)
        .map(|v| v.is_some())
        .map_err(io_error("exists check"))
}

fn next_seq(db: &DB) -> Result<u64, StoreError> {
    let cf = column(db, CF_METADATA)?;
    match db.get_cf(cf, NEXT_SEQ_KEY).map_err(io_error("get"))? {
        Some(bytes) => {
            let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| StoreError::Corrupted {
                message: "insertion counter has wrong width".to_string(),
            })?;
            Ok(u64::from_be_bytes(raw))
        }
        None => Ok(0),
    }
}

#[async_trait]
impl DocumentRepository for RocksDbDocumentStore {
    async fn insert_one(
        &self,
        document: Document,
        max_per_owner: u64,
    ) -> Result<InsertOutcome, StoreError> {
        self.blocking(move |database| {
            let db = database.db.write();
            let documents = column(&db, CF_DOCUMENTS)?;

            let owned = prefix_scan(&db, documents, document.user_id.as_bytes())?.len() as u64;
            if owned >= max_per_owner {
                return Ok(InsertOutcome::QuotaReached);
            }

            let seq = next_seq(&db)?;
            let key = document_key(document.user_id, document.id);
            let value = encode(&StoredDocument { document, seq })?;

            let mut batch = WriteBatch::default();
            batch.put_cf(documents, key, value);
            batch.put_cf(column(&db, CF_METADATA)?, NEXT_SEQ_KEY, (seq + 1).to_be_bytes());
            database.commit(&db, batch)?;

            Ok(InsertOutcome::Inserted)
        })
        .await
    }

    async fn update_one(&self, update: DocumentUpdate) -> Result<bool, StoreError> {
        self.blocking(move |database| {
            let db = database.db.write();
            let documents = column(&db, CF_DOCUMENTS)?;
            let key = document_key(update.user_id, update.id);

            let Some(bytes) = db.get_cf(documents, key).map_err(io_error("get"))? else {
                return Ok(false);
            };
            let mut stored: StoredDocument = decode(&bytes)?;
            stored.document.apply(update.fields, update.updated_at);

            let mut batch = WriteBatch::default();
            batch.put_cf(documents, key, encode(&stored)?);
            database.commit(&db, batch)?;
            Ok(true)
        })
        .await
    }

    async fn delete_one(&self, id: DocumentId, owner: UserId) -> Result<bool, StoreError> {
        self.blocking(move |database| {
            let db = database.db.write();
            let key = document_key(owner, id);
            if !key_exists(&db, CF_DOCUMENTS, &key)? {
                return Ok(false);
            }

            let notifications = column(&db, CF_NOTIFICATIONS)?;
            let mut batch = WriteBatch::default();
            batch.delete_cf(column(&db, CF_DOCUMENTS)?, key);
            for (child_key, _) in prefix_scan(&db, notifications, id.as_bytes())? {
                batch.delete_cf(notifications, child_key);
            }
            database.commit(&db, batch)?;
            Ok(true)
        })
        .await
    }

    async fn find_one(
        &self,
        id: DocumentId,
        owner: UserId,
    ) -> Result<Option<Document>, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            let documents = column(&db, CF_DOCUMENTS)?;
            db.get_cf(documents, document_key(owner, id))
                .map_err(io_error("get"))?
                .map(|bytes| decode::<StoredDocument>(&bytes).map(|s| s.document))
                .transpose()
        })
        .await
    }

    async fn find_all(&self, owner: UserId) -> Result<Vec<Document>, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            Ok(owned_documents(&db, owner)?
                .into_iter()
                .map(|s| s.document)
                .collect())
        })
        .await
    }

    async fn exists(&self, id: DocumentId, owner: UserId) -> Result<bool, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            key_exists(&db, CF_DOCUMENTS, &document_key(owner, id))
        })
        .await
    }

    async fn count(&self, owner: UserId) -> Result<u64, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            let documents = column(&db, CF_DOCUMENTS)?;
            Ok(prefix_scan(&db, documents, owner.as_bytes())?.len() as u64)
        })
        .await
    }

    async fn count_grouped_by_type(
        &self,
        owner: UserId,
    ) -> Result<BTreeMap<DocumentType, u64>, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            let mut counts = BTreeMap::new();
            for stored in owned_documents(&db, owner)? {
                *counts.entry(stored.document.document_type).or_insert(0) += 1;
            }
            Ok(counts)
        })
        .await
    }

    async fn find_latest(&self, owner: UserId, limit: usize) -> Result<Vec<Document>, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            let mut owned = owned_documents(&db, owner)?;
            owned.sort_by_key(|s| std::cmp::Reverse((s.document.created_at, s.seq)));
            Ok(owned.into_iter().take(limit).map(|s| s.document).collect())
        })
        .await
    }
}

#[async_trait]
impl NotificationRepository for RocksDbDocumentStore {
    async fn insert_one(
        &self,
        notification: Notification,
        max_per_document: u64,
    ) -> Result<InsertOutcome, StoreError> {
        self.blocking(move |database| {
            let db = database.db.write();

            let parent = document_key(notification.user_id, notification.document_id);
            if !key_exists(&db, CF_DOCUMENTS, &parent)? {
                return Ok(InsertOutcome::ParentMissing);
            }
            if child_count(&db, notification.document_id)? >= max_per_document {
                return Ok(InsertOutcome::QuotaReached);
            }

            let mut batch = WriteBatch::default();
            batch.put_cf(
                column(&db, CF_NOTIFICATIONS)?,
                notification_key(notification.document_id, notification.id),
                encode(&notification)?,
            );
            database.commit(&db, batch)?;
            Ok(InsertOutcome::Inserted)
        })
        .await
    }

    async fn update_one(&self, update: NotificationUpdate) -> Result<bool, StoreError> {
        self.blocking(move |database| {
            let db = database.db.write();
            let notifications = column(&db, CF_NOTIFICATIONS)?;
            let key = notification_key(update.document_id, update.id);

            let Some(bytes) = db.get_cf(notifications, key).map_err(io_error("get"))? else {
                return Ok(false);
            };
            let mut notification: Notification = decode(&bytes)?;
            notification.date = update.date;
            notification.updated_at = update.updated_at;

            let mut batch = WriteBatch::default();
            batch.put_cf(notifications, key, encode(&notification)?);
            database.commit(&db, batch)?;
            Ok(true)
        })
        .await
    }

    async fn delete_one(
        &self,
        id: NotificationId,
        document_id: DocumentId,
    ) -> Result<bool, StoreError> {
        self.blocking(move |database| {
            let db = database.db.write();
            let key = notification_key(document_id, id);
            if !key_exists(&db, CF_NOTIFICATIONS, &key)? {
                return Ok(false);
            }

            let mut batch = WriteBatch::default();
            batch.delete_cf(column(&db, CF_NOTIFICATIONS)?, key);
            database.commit(&db, batch)?;
            Ok(true)
        })
        .await
    }

    async fn find_all(&self, document_id: DocumentId) -> Result<Vec<Notification>, StoreError> {
        self.blocking(move |database| children(&database.db.read(), document_id))
            .await
    }

    async fn count(&self, document_id: DocumentId) -> Result<u64, StoreError> {
        self.blocking(move |database| child_count(&database.db.read(), document_id))
            .await
    }

    async fn count_all(&self, owner: UserId) -> Result<u64, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            let mut total = 0;
            for stored in owned_documents(&db, owner)? {
                total += child_count(&db, stored.document.id)?;
            }
            Ok(total)
        })
        .await
    }

    async fn find_all_for_user(&self, owner: UserId) -> Result<Vec<Notification>, StoreError> {
        self.blocking(move |database| {
            let db = database.db.read();
            let mut all = Vec::new();
            for stored in owned_documents(&db, owner)? {
                all.extend(children(&db, stored.document.id)?);
            }
            Ok(all)
        })
        .await
    }
}
