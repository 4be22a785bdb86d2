//! Construction of the application object graph.
//!
//! Every collaborator is built once from [`AppConfig`] and shared through
//! `Arc<dyn Trait>`; the REST layer receives the result as [`AppState`].

use agora_config::AppConfig;
use agora_core::AgoraResult;
use agora_repository::{connect_store, DocumentStore, Repositories, StoreHealthCheck};
use agora_rest::AppState;
use agora_security::{IdentityProvider, LocalIdentityProvider};
use agora_service::{mailer_from_config, media_host_from_config, MediaHost, Services};
use std::sync::Arc;
use tracing::info;

/// Fully wired application components.
pub struct AppContainer {
    pub config: AppConfig,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub media_host: Arc<dyn MediaHost>,
    pub services: Services,
}

impl AppContainer {
    /// Connects the store and builds every collaborator and service.
    pub async fn build(config: AppConfig) -> AgoraResult<Self> {
        let store = connect_store(&config.store).await?;
        let repos = Repositories::new(store.clone());

        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(&config.identity));
        let mailer = mailer_from_config(&config.mail);
        let media_host = media_host_from_config(&config.media)?;

        let services = Services::build(repos, identity.clone(), mailer, media_host.clone(), &config);
        info!("Application container built");

        Ok(Self {
            config,
            store,
            identity,
            media_host,
            services,
        })
    }

    /// State handed to the HTTP router.
    pub fn app_state(&self) -> AppState {
        AppState::new(self.services.clone(), self.identity.clone())
            .with_health_check(Arc::new(StoreHealthCheck::new(self.store.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_container_builds_from_defaults() {
        let container = AppContainer::build(AppConfig::default()).await.unwrap();
        assert_eq!(container.media_host.name(), "memory");
        assert_eq!(container.app_state().health_checks.len(), 1);
    }

    #[tokio::test]
    async fn test_http_media_needs_endpoint() {
        let mut config = AppConfig::default();
        config.media.backend = agora_config::MediaBackend::Http;
        config.media.endpoint = None;

        let err = AppContainer::build(config).await.err().unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
