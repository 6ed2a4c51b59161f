use std::sync::Arc;

use publications_common::transition_policy;

use crate::domain::AppState;
use crate::domain::publications::PublicationService;
use crate::infrastructure::authors::{AuthorsClientConfig, AuthorsServiceClient};
use crate::infrastructure::persistence::InMemoryPublicationRepository;
use crate::infrastructure::settings::Settings;

pub mod authors;
pub mod http;
pub mod persistence;
pub mod settings;

#[derive(Clone)]
pub struct AppStateImpl {
    publications: Arc<PublicationService<InMemoryPublicationRepository, AuthorsServiceClient>>,
}

impl AppStateImpl {
    /// Composition root: takes configuration, returns a fully wired
    /// orchestrator. No process-wide singletons.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let authors = AuthorsServiceClient::new(AuthorsClientConfig::from(&settings.authors))?;
        let repository = InMemoryPublicationRepository::default();
        let policy = transition_policy(&settings.transition_policy);

        Ok(Self {
            publications: Arc::new(PublicationService::new(repository, authors, policy)),
        })
    }
}

impl AppState for AppStateImpl {
    type R = InMemoryPublicationRepository;
    type A = AuthorsServiceClient;

    fn publications(&self) -> &PublicationService<Self::R, Self::A> {
        &self.publications
    }
}
