//! In-process document store.
//!
//! Used for local development and tests. Committed data lives in a
//! `BTreeMap` per collection behind a `parking_lot::RwLock`; every writer
//! (transactions and batches) holds a single `tokio::sync::Mutex`, which
//! makes transactions serializable.

use crate::dao::{
    Document, DocumentPath, DocumentStore, Fields, Query, StoreTransaction, WriteBatch, WriteOp,
};
use agora_core::{AgoraError, AgoraResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct StoredDocument {
    fields: Fields,
    create_time: DateTime<Utc>,
    update_time: DateTime<Utc>,
}

type Collections = BTreeMap<String, BTreeMap<String, StoredDocument>>;

/// Document store kept in process memory.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    data: Arc<RwLock<Collections>>,
    writer: Arc<Mutex<()>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.data.read().get(collection).map_or(0, BTreeMap::len)
    }
}

impl fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.read();
        f.debug_struct("InMemoryDocumentStore")
            .field("collections", &data.len())
            .field("documents", &data.values().map(BTreeMap::len).sum::<usize>())
            .finish()
    }
}

fn read_document(data: &Collections, path: &DocumentPath) -> Option<Document> {
    data.get(path.collection())
        .and_then(|docs| docs.get(path.id()))
        .map(|stored| Document {
            path: path.clone(),
            fields: stored.fields.clone(),
            create_time: stored.create_time,
            update_time: stored.update_time,
        })
}

fn run_query(data: &Collections, query: &Query) -> AgoraResult<Vec<Document>> {
    let Some(docs) = data.get(&query.collection) else {
        if query.start_after.is_some() {
            return Err(AgoraError::validation("Invalid cursor"));
        }
        return Ok(Vec::new());
    };

    let mut matched: Vec<(&String, &StoredDocument)> = docs
        .iter()
        .filter(|(_, doc)| query.matches(&doc.fields))
        .collect();
    matched.sort_by(|a, b| query.compare((a.0.as_str(), &a.1.fields), (b.0.as_str(), &b.1.fields)));

    if let Some(cursor) = &query.start_after {
        let anchor = docs
            .get(cursor)
            .ok_or_else(|| AgoraError::validation("Invalid cursor"))?;
        matched.retain(|(id, doc)| {
            query.compare((id.as_str(), &doc.fields), (cursor.as_str(), &anchor.fields))
                == std::cmp::Ordering::Greater
        });
    }

    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(matched
        .into_iter()
        .take(limit)
        .map(|(id, stored)| Document {
            path: DocumentPath::new(query.collection.clone(), id.clone()),
            fields: stored.fields.clone(),
            create_time: stored.create_time,
            update_time: stored.update_time,
        })
        .collect())
}

/// Validates and applies `ops` all-or-nothing.
fn apply_ops(data: &RwLock<Collections>, ops: Vec<WriteOp>) -> AgoraResult<()> {
    if ops.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    let mut guard = data.write();

    // Stage every change first so that a failing op leaves the store untouched.
    let mut staged: HashMap<DocumentPath, Option<StoredDocument>> = HashMap::new();
    for op in ops {
        let path = op.path().clone();
        let current = match staged.get(&path) {
            Some(doc) => doc.clone(),
            None => guard
                .get(path.collection())
                .and_then(|docs| docs.get(path.id()))
                .cloned(),
        };
        let next = apply_op(op, current, now)?;
        staged.insert(path, next);
    }

    for (path, doc) in staged {
        match doc {
            Some(doc) => {
                guard
                    .entry(path.collection().to_string())
                    .or_default()
                    .insert(path.id().to_string(), doc);
            }
            None => {
                if let Some(docs) = guard.get_mut(path.collection()) {
                    docs.remove(path.id());
                    if docs.is_empty() {
                        guard.remove(path.collection());
                    }
                }
            }
        }
    }
    Ok(())
}

fn apply_op(
    op: WriteOp,
    current: Option<StoredDocument>,
    now: DateTime<Utc>,
) -> AgoraResult<Option<StoredDocument>> {
    let created = |fields: Fields| StoredDocument {
        fields,
        create_time: now,
        update_time: now,
    };

    match op {
        WriteOp::Create { path, fields } => match current {
            Some(_) => Err(AgoraError::conflict(format!("Document already exists: {path}"))),
            None => Ok(Some(created(fields))),
        },
        WriteOp::Set { fields, .. } => Ok(Some(match current {
            Some(existing) => StoredDocument {
                fields,
                create_time: existing.create_time,
                update_time: now,
            },
            None => created(fields),
        })),
        WriteOp::Merge { fields, .. } => Ok(Some(match current {
            Some(mut existing) => {
                existing.fields.extend(fields);
                existing.update_time = now;
                existing
            }
            None => created(fields),
        })),
        WriteOp::Update { path, fields } => {
            let mut existing =
                current.ok_or_else(|| AgoraError::not_found("Document", path.to_string()))?;
            existing.fields.extend(fields);
            existing.update_time = now;
            Ok(Some(existing))
        }
        WriteOp::Increment { path, field, by } => {
            let mut existing =
                current.ok_or_else(|| AgoraError::not_found("Document", path.to_string()))?;
            let value = existing
                .fields
                .get(&field)
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let next = value.saturating_add(by).max(0);
            existing.fields.insert(field, Value::from(next));
            existing.update_time = now;
            Ok(Some(existing))
        }
        WriteOp::Delete { .. } => Ok(None),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> AgoraResult<Option<Document>> {
        trace!("Store: get {}", path);
        Ok(read_document(&self.data.read(), path))
    }

    async fn get_all(&self, paths: &[DocumentPath]) -> AgoraResult<Vec<Option<Document>>> {
        let data = self.data.read();
        Ok(paths.iter().map(|path| read_document(&data, path)).collect())
    }

    async fn query(&self, query: &Query) -> AgoraResult<Vec<Document>> {
        trace!("Store: query {}", query.collection);
        run_query(&self.data.read(), query)
    }

    async fn commit(&self, batch: WriteBatch) -> AgoraResult<()> {
        let _writer = self.writer.lock().await;
        debug!("Store: committing batch of {} writes", batch.len());
        apply_ops(&self.data, batch.into_ops())
    }

    async fn begin(&self) -> AgoraResult<Box<dyn StoreTransaction>> {
        let guard = Arc::clone(&self.writer).lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            data: Arc::clone(&self.data),
            guard: Some(guard),
            ops: Vec::new(),
        }))
    }

    async fn health_check(&self) -> AgoraResult<()> {
        Ok(())
    }
}

/// Transaction over [`InMemoryDocumentStore`].
///
/// Holds the writer lock from `begin` until commit or drop.
struct MemoryTransaction {
    data: Arc<RwLock<Collections>>,
    guard: Option<OwnedMutexGuard<()>>,
    ops: Vec<WriteOp>,
}

impl MemoryTransaction {
    fn ensure_readable(&self) -> AgoraResult<()> {
        if self.guard.is_none() {
            return Err(AgoraError::internal("Transaction already committed"));
        }
        if !self.ops.is_empty() {
            return Err(AgoraError::internal(
                "Transaction reads must happen before writes",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get(&mut self, path: &DocumentPath) -> AgoraResult<Option<Document>> {
        self.ensure_readable()?;
        Ok(read_document(&self.data.read(), path))
    }

    async fn query(&mut self, query: &Query) -> AgoraResult<Vec<Document>> {
        self.ensure_readable()?;
        run_query(&self.data.read(), query)
    }

    fn write(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    async fn commit(&mut self) -> AgoraResult<()> {
        let Some(guard) = self.guard.take() else {
            return Err(AgoraError::internal("Transaction already committed"));
        };
        let ops = std::mem::take(&mut self.ops);
        debug!("Store: committing transaction of {} writes", ops.len());
        let result = apply_ops(&self.data, ops);
        drop(guard);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{fields, Direction, Filter};
    use serde_json::json;
    use std::time::Duration;

    fn counter_path() -> DocumentPath {
        DocumentPath::new("counters", "c1")
    }

    async fn seed_counter(store: &InMemoryDocumentStore, count: i64) {
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::Set {
            path: counter_path(),
            fields: fields([("count", json!(count))]),
        });
        store.commit(batch).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = InMemoryDocumentStore::new();
        seed_counter(&store, 3).await;

        let doc = store.get(&counter_path()).await.unwrap().unwrap();
        assert_eq!(doc.get_i64("count"), 3);
        assert_eq!(doc.id(), "c1");
        assert!(store.get(&DocumentPath::new("counters", "nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let store = InMemoryDocumentStore::new();
        seed_counter(&store, 1).await;

        let mut batch = WriteBatch::new();
        batch
            .push(WriteOp::increment(counter_path(), "count", 1))
            .push(WriteOp::Create {
                path: counter_path(),
                fields: Fields::new(),
            });
        let err = store.commit(batch).await.unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");

        let doc = store.get(&counter_path()).await.unwrap().unwrap();
        assert_eq!(doc.get_i64("count"), 1);
    }

    #[tokio::test]
    async fn test_increment_floors_at_zero_and_requires_document() {
        let store = InMemoryDocumentStore::new();
        seed_counter(&store, 0).await;

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::increment(counter_path(), "count", -1));
        store.commit(batch).await.unwrap();
        let doc = store.get(&counter_path()).await.unwrap().unwrap();
        assert_eq!(doc.get_i64("count"), 0);

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::increment(DocumentPath::new("counters", "ghost"), "count", 1));
        assert!(store.commit(batch).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_requires_document_but_merge_creates() {
        let store = InMemoryDocumentStore::new();
        let path = DocumentPath::new("users", "u1");

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::update(path.clone(), fields([("bio", json!("hi"))])));
        assert!(store.commit(batch).await.unwrap_err().is_not_found());

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::merge(path.clone(), fields([("bio", json!("hi"))])));
        batch.push(WriteOp::merge(path.clone(), fields([("name", json!("Ann"))])));
        store.commit(batch).await.unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.fields["bio"], json!("hi"));
        assert_eq!(doc.fields["name"], json!("Ann"));
    }

    #[tokio::test]
    async fn test_query_filters_orders_and_pages() {
        let store = InMemoryDocumentStore::new();
        let mut batch = WriteBatch::new();
        for (id, author, at) in [("p1", "a", 1), ("p2", "b", 2), ("p3", "a", 3), ("p4", "a", 4)] {
            batch.push(WriteOp::Set {
                path: DocumentPath::new("posts", id),
                fields: fields([("author_id", json!(author)), ("created_at", json!(at))]),
            });
        }
        store.commit(batch).await.unwrap();

        let query = Query::collection("posts")
            .filter(Filter::eq("author_id", "a"))
            .order_by("created_at", Direction::Descending)
            .limit(2);
        let first: Vec<String> = store
            .query(&query)
            .await
            .unwrap()
            .iter()
            .map(|d| d.id().to_string())
            .collect();
        assert_eq!(first, vec!["p4", "p3"]);

        let next = store
            .query(&query.clone().start_after(Some("p3")))
            .await
            .unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id(), "p1");

        let err = store
            .query(&query.start_after(Some("missing")))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_dropped_transaction_writes_nothing() {
        let store = InMemoryDocumentStore::new();
        seed_counter(&store, 5).await;

        {
            let mut tx = store.begin().await.unwrap();
            let doc = tx.get(&counter_path()).await.unwrap().unwrap();
            assert_eq!(doc.get_i64("count"), 5);
            tx.write(WriteOp::increment(counter_path(), "count", 1));
        }

        let doc = store.get(&counter_path()).await.unwrap().unwrap();
        assert_eq!(doc.get_i64("count"), 5);
    }

    #[tokio::test]
    async fn test_reads_after_writes_are_rejected() {
        let store = InMemoryDocumentStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.write(WriteOp::delete(counter_path()));
        assert!(tx.get(&counter_path()).await.is_err());
        tx.commit().await.unwrap();
        assert!(tx.commit().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_transactions_do_not_lose_updates() {
        let store = InMemoryDocumentStore::new();
        seed_counter(&store, 0).await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut tx = store.begin().await.unwrap();
                let current = tx.get(&counter_path()).await.unwrap().unwrap().get_i64("count");
                tokio::time::sleep(Duration::from_millis(1)).await;
                tx.write(WriteOp::update(counter_path(), fields([("count", json!(current + 1))])));
                tx.commit().await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let doc = store.get(&counter_path()).await.unwrap().unwrap();
        assert_eq!(doc.get_i64("count"), 20);
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let store = InMemoryDocumentStore::new();
        seed_counter(&store, 1).await;
        assert_eq!(store.count("counters"), 1);

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::delete(counter_path()));
        batch.push(WriteOp::delete(DocumentPath::new("counters", "absent")));
        store.commit(batch).await.unwrap();
        assert_eq!(store.count("counters"), 0);
    }
}
