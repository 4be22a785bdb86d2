//! State shared by the domain services.

use crate::access::Access;
use agora_config::SocialConfig;
use agora_repository::Repositories;

/// Repositories, social rules and the visibility helper.
#[derive(Clone)]
pub struct ServiceContext {
    pub(crate) repos: Repositories,
    pub(crate) social: SocialConfig,
    pub(crate) access: Access,
}

impl ServiceContext {
    #[must_use]
    pub fn new(repos: Repositories, social: SocialConfig) -> Self {
        let access = Access::new(repos.users.clone());
        Self {
            repos,
            social,
            access,
        }
    }
}
