//! Application state for Axum handlers.

use agora_core::HealthCheck;
use agora_security::IdentityProvider;
use agora_service::Services;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub identity: Arc<dyn IdentityProvider>,
    pub health_checks: Vec<Arc<dyn HealthCheck>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(services: Services, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            services,
            identity,
            health_checks: Vec::new(),
        }
    }

    /// Adds a dependency probed by the readiness endpoint.
    #[must_use]
    pub fn with_health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        self.health_checks.push(check);
        self
    }
}
