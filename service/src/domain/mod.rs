pub mod authors;
pub mod error;
pub mod publications;
pub mod repository;

use authors::AuthorsGateway;
use publications::PublicationService;
use repository::PublicationRepository;

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type R: PublicationRepository;
    type A: AuthorsGateway;

    fn publications(&self) -> &PublicationService<Self::R, Self::A>;
}
