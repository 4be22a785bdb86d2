//! # Agora Repository
//!
//! Data access for the social backend:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn UserRepository>, Arc<dyn ContentRepository>, ...  (domain interfaces)
//! UserRepositoryImpl, ContentRepositoryImpl, ...                 (typed operations)
//!   ↓  Arc<dyn DocumentStore>                                    (DAO interface)
//! InMemoryDocumentStore                                          (DAO impl)
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   traits.rs                          ← repository traits
//!   collections.rs                     ← collection names and document paths
//!   store.rs                           ← store construction, Repositories bundle
//!   impl/
//!     user_repository_impl.rs          ← profiles, follows, blocks, saved
//!     content_repository_impl.rs       ← posts, stories, feelings, likes, saves
//!     comment_repository_impl.rs       ← comments and comment likes
//!     conversation_repository_impl.rs  ← messages and inbox fan-out
//!     report_repository_impl.rs        ← moderation reports
//!   dao/
//!     document.rs                      ← paths, documents, writes, queries
//!     document_store.rs                ← DocumentStore / StoreTransaction traits
//!     impl/
//!       memory_document_store.rs       ← InMemoryDocumentStore
//! ```
//!
//! Every counter lives next to the marker documents that drive it and is
//! only ever changed in the same transaction as those markers.

pub mod collections;
pub mod dao;
pub mod r#impl;
pub mod traits;

mod store;

pub use dao::{DocumentStore, InMemoryDocumentStore, StoreTransaction};
pub use r#impl::{
    CommentRepositoryImpl, ContentRepositoryImpl, ConversationRepositoryImpl,
    ReportRepositoryImpl, UserRepositoryImpl,
};
pub use store::{connect_store, Repositories, StoreHealthCheck};
pub use traits::*;
