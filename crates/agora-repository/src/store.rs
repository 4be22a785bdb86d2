//! Document store construction and the repository bundle.

use crate::dao::{DocumentStore, InMemoryDocumentStore};
use crate::r#impl::{
    CommentRepositoryImpl, ContentRepositoryImpl, ConversationRepositoryImpl,
    ReportRepositoryImpl, UserRepositoryImpl,
};
use crate::traits::{
    CommentRepository, ContentRepository, ConversationRepository, ReportRepository,
    UserRepository,
};
use agora_config::{StoreBackend, StoreConfig};
use agora_core::{AgoraResult, HealthCheck, HealthStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Opens the document store named by the configuration.
pub async fn connect_store(config: &StoreConfig) -> AgoraResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Memory => {
            warn!("Using the in-memory document store; data is lost on restart");
            Arc::new(InMemoryDocumentStore::new())
        }
    };
    store.health_check().await?;
    info!("Document store ready ({})", config.backend);
    Ok(store)
}

/// Every repository, sharing one store.
#[derive(Clone)]
pub struct Repositories {
    pub store: Arc<dyn DocumentStore>,
    pub users: Arc<dyn UserRepository>,
    pub contents: Arc<dyn ContentRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub reports: Arc<dyn ReportRepository>,
}

impl Repositories {
    /// Builds the repositories over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Arc::new(UserRepositoryImpl::new(store.clone())),
            contents: Arc::new(ContentRepositoryImpl::new(store.clone())),
            comments: Arc::new(CommentRepositoryImpl::new(store.clone())),
            conversations: Arc::new(ConversationRepositoryImpl::new(store.clone())),
            reports: Arc::new(ReportRepositoryImpl::new(store.clone())),
            store,
        }
    }

    /// Repositories over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()))
    }
}

/// Health probe for the document store.
pub struct StoreHealthCheck {
    store: Arc<dyn DocumentStore>,
}

impl StoreHealthCheck {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HealthCheck for StoreHealthCheck {
    fn name(&self) -> &str {
        "document_store"
    }

    async fn check(&self) -> HealthStatus {
        match self.store.health_check().await {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_memory_store() {
        let store = connect_store(&StoreConfig::default()).await.unwrap();
        let health = StoreHealthCheck::new(store).check().await;
        assert_eq!(health, HealthStatus::Healthy);
    }
}
