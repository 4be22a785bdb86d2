//! DAO implementations.
//!
//! Trait definitions live in the parent `dao/` module
//! (`document_store.rs`). Implementations are organized by backend.

pub mod memory_document_store;

pub use memory_document_store::InMemoryDocumentStore;
