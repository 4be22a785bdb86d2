//! DAO (Data Access Object) layer.
//!
//! The document store is the single low-level data source. Repositories
//! build typed operations (toggles, fan-out, cascades) on top of its
//! documents, queries, batches and transactions.
//!
//! Hierarchy:
//! ```text
//! Service → Repository (interface + impl) → DocumentStore (interface + impl) → database
//! ```

pub mod document;
pub mod document_store;
pub mod r#impl;

pub use document::*;
pub use document_store::{DocumentStore, StoreTransaction};
pub use r#impl::InMemoryDocumentStore;
