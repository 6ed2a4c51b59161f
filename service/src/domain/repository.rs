use chrono::{DateTime, Utc};
use thiserror::Error;

use publications_common::{
    AuthorId, Publication, PublicationDescription, PublicationId, PublicationStatus,
    PublicationTitle,
};

/// Fields of a publication to be created. The orchestrator forces the
/// initial status; `published_date` always starts empty.
#[derive(Debug, Clone)]
pub struct NewPublication {
    pub title: PublicationTitle,
    pub description: PublicationDescription,
    pub author_id: AuthorId,
    pub status: PublicationStatus,
    pub review_comments: Option<String>,
}

/// Partial update applied by the store; `None` fields are left untouched.
/// `published_date` is only ever supplied on a transition to PUBLISHED, so
/// a date once set is never cleared.
#[derive(Debug, Clone, Default)]
pub struct PublicationChanges {
    pub title: Option<PublicationTitle>,
    pub description: Option<PublicationDescription>,
    pub author_id: Option<AuthorId>,
    pub review_comments: Option<String>,
    pub status: Option<PublicationStatus>,
    pub published_date: Option<DateTime<Utc>>,
}

impl PublicationChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.author_id.is_none()
            && self.review_comments.is_none()
            && self.status.is_none()
            && self.published_date.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublicationFilter {
    pub status: Option<PublicationStatus>,
    pub author_id: Option<AuthorId>,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone)]
pub struct PublicationPage {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub publications: Vec<Publication>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCount {
    pub status: PublicationStatus,
    pub count: i64,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Persistence port for publications. The store is an external
/// collaborator: plain records in, plain records out, timestamps
/// maintained by the adapter.
pub trait PublicationRepository: Send + Sync + 'static {
    fn create(
        &self,
        new: NewPublication,
    ) -> impl Future<Output = Result<Publication, RepositoryError>> + Send;

    fn find_by_id(
        &self,
        id: PublicationId,
    ) -> impl Future<Output = Result<Option<Publication>, RepositoryError>> + Send;

    /// Newest-first listing, optionally filtered by status and/or author.
    fn list(
        &self,
        filter: PublicationFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<PublicationPage, RepositoryError>> + Send;

    fn update(
        &self,
        id: PublicationId,
        changes: PublicationChanges,
    ) -> impl Future<Output = Result<Publication, RepositoryError>> + Send;

    fn delete(&self, id: PublicationId) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Count-by-status aggregation for the statistics endpoint.
    fn count_by_status(
        &self,
    ) -> impl Future<Output = Result<Vec<StatusCount>, RepositoryError>> + Send;
}
