//! `DocumentStore` trait: low-level document database access.
//!
//! This is the DAO interface every repository is written against. An
//! implementation wraps one managed document database client (or the
//! in-process [`InMemoryDocumentStore`]).
//!
//! [`InMemoryDocumentStore`]: crate::dao::InMemoryDocumentStore

use crate::dao::{Document, DocumentPath, Query, WriteBatch, WriteOp};
use agora_core::AgoraResult;
use async_trait::async_trait;

/// Document database client.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document.
    async fn get(&self, path: &DocumentPath) -> AgoraResult<Option<Document>>;

    /// Reads several documents, preserving order.
    async fn get_all(&self, paths: &[DocumentPath]) -> AgoraResult<Vec<Option<Document>>>;

    /// Runs a query against committed state.
    async fn query(&self, query: &Query) -> AgoraResult<Vec<Document>>;

    /// Applies every write of the batch atomically.
    async fn commit(&self, batch: WriteBatch) -> AgoraResult<()>;

    /// Starts a read-write transaction.
    ///
    /// Transactions are serializable: no other write commits between the
    /// first read and the commit. Dropping a transaction discards its
    /// buffered writes.
    async fn begin(&self) -> AgoraResult<Box<dyn StoreTransaction>>;

    /// Verifies the store is reachable.
    async fn health_check(&self) -> AgoraResult<()>;
}

/// Read-modify-write unit of work.
///
/// Reads must happen before the first write, as with managed document
/// databases; writes are buffered until [`StoreTransaction::commit`].
#[async_trait]
pub trait StoreTransaction: Send {
    /// Reads one document.
    async fn get(&mut self, path: &DocumentPath) -> AgoraResult<Option<Document>>;

    /// Runs a query.
    async fn query(&mut self, query: &Query) -> AgoraResult<Vec<Document>>;

    /// Buffers a write.
    fn write(&mut self, op: WriteOp);

    /// Applies the buffered writes atomically and ends the transaction.
    async fn commit(&mut self) -> AgoraResult<()>;
}
