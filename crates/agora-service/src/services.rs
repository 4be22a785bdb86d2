//! Wiring of the domain services over shared collaborators.

use crate::mail::Mailer;
use crate::media::MediaHost;
use crate::{
    AuthService, AuthServiceImpl, ContentService, ContentServiceImpl, InteractionService,
    InteractionServiceImpl, MediaService, MediaServiceImpl, MessageService, MessageServiceImpl,
    ReportService, ReportServiceImpl, ServiceContext, UserService, UserServiceImpl,
};
use agora_config::AppConfig;
use agora_repository::Repositories;
use agora_security::IdentityProvider;
use std::sync::Arc;

/// Every domain service behind its trait.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub contents: Arc<dyn ContentService>,
    pub interactions: Arc<dyn InteractionService>,
    pub messages: Arc<dyn MessageService>,
    pub reports: Arc<dyn ReportService>,
    pub media: Arc<dyn MediaService>,
}

impl Services {
    /// Builds all services from the repositories and the external
    /// collaborators.
    #[must_use]
    pub fn build(
        repos: Repositories,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
        media_host: Arc<dyn MediaHost>,
        config: &AppConfig,
    ) -> Self {
        let ctx = ServiceContext::new(repos.clone(), config.social.clone());

        Self {
            auth: Arc::new(AuthServiceImpl::new(
                identity.clone(),
                repos.users.clone(),
                mailer,
                &config.identity,
                &config.mail,
            )),
            users: Arc::new(UserServiceImpl::new(ctx.clone(), identity)),
            contents: Arc::new(ContentServiceImpl::new(ctx.clone())),
            interactions: Arc::new(InteractionServiceImpl::new(ctx.clone())),
            messages: Arc::new(MessageServiceImpl::new(ctx.clone())),
            reports: Arc::new(ReportServiceImpl::new(ctx)),
            media: Arc::new(MediaServiceImpl::new(media_host, &config.media)),
        }
    }
}
