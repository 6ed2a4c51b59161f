use serde::{Deserialize, Serialize};
use thiserror::Error;

use publications_common::AuthorId;

/// Projection of an author owned by the remote authors service. Used only
/// to enrich responses; never persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub expertise: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
}

/// One page of the remote authors listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorsPage {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub authors: Vec<Author>,
}

/// Failures of the remote authors lookup, classified so callers never have
/// to inspect message text. "Confirmed absent" (`NotFound`) is distinct
/// from "could not verify" (`Timeout` / `Unavailable`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorsError {
    #[error("Author with ID {0} not found")]
    NotFound(i64),

    #[error("Invalid author ID: {0}")]
    InvalidId(i64),

    #[error("authors service timed out fetching author {id} after {attempts} attempts")]
    Timeout { id: i64, attempts: u32 },

    #[error("authors service unavailable after {attempts} attempts for author {id}: {reason}")]
    Unavailable { id: i64, attempts: u32, reason: String },

    #[error("Authors Service is unavailable")]
    HealthCheckFailed,

    #[error("unexpected response from authors service: {0}")]
    Unexpected(String),
}

/// Outbound port to the authors service: existence and fetch for a single
/// remotely-owned entity.
pub trait AuthorsGateway: Send + Sync + 'static {
    /// Fetch an author, retrying transient failures. A definitive "does not
    /// exist" answer fails fast with [`AuthorsError::NotFound`].
    fn fetch(&self, id: AuthorId) -> impl Future<Output = Result<Author, AuthorsError>> + Send;

    fn list(
        &self,
        page: i64,
        limit: i64,
    ) -> impl Future<Output = Result<AuthorsPage, AuthorsError>> + Send;

    /// Single-attempt liveness probe; any problem collapses into one
    /// "service unavailable" error.
    fn health(&self) -> impl Future<Output = Result<(), AuthorsError>> + Send;

    /// Advisory existence check derived from [`fetch`](Self::fetch):
    /// confirmed absence reads as `false`, transient failure stays an error
    /// rather than masquerading as absence.
    fn exists(&self, id: AuthorId) -> impl Future<Output = Result<bool, AuthorsError>> + Send {
        async move {
            match self.fetch(id).await {
                Ok(_) => Ok(true),
                Err(AuthorsError::NotFound(_)) => Ok(false),
                Err(other) => Err(other),
            }
        }
    }

    /// Validates the raw reference before going to the network, then
    /// fetches. The id check is local: non-positive ids can never exist.
    fn validate_and_fetch(
        &self,
        raw_id: i64,
    ) -> impl Future<Output = Result<Author, AuthorsError>> + Send {
        async move {
            let id = AuthorId::try_new(raw_id).map_err(|_| AuthorsError::InvalidId(raw_id))?;
            self.fetch(id).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gateway double that answers from a fixed script.
    #[derive(Clone)]
    struct ScriptedAuthors {
        outcome: Result<Author, AuthorsError>,
    }

    impl AuthorsGateway for ScriptedAuthors {
        async fn fetch(&self, _id: AuthorId) -> Result<Author, AuthorsError> {
            self.outcome.clone()
        }

        async fn list(&self, _page: i64, _limit: i64) -> Result<AuthorsPage, AuthorsError> {
            unimplemented!("not exercised")
        }

        async fn health(&self) -> Result<(), AuthorsError> {
            Ok(())
        }
    }

    fn author() -> Author {
        Author {
            id: 1,
            name: "Ada".into(),
            email: "ada@example.com".into(),
            bio: None,
            expertise: None,
            nationality: None,
        }
    }

    #[tokio::test]
    async fn exists_distinguishes_absent_from_unverifiable() {
        let id = AuthorId::try_new(1).unwrap();

        let present = ScriptedAuthors { outcome: Ok(author()) };
        assert_eq!(present.exists(id).await, Ok(true));

        let absent = ScriptedAuthors { outcome: Err(AuthorsError::NotFound(1)) };
        assert_eq!(absent.exists(id).await, Ok(false));

        let down = ScriptedAuthors {
            outcome: Err(AuthorsError::Unavailable {
                id: 1,
                attempts: 3,
                reason: "connection refused".into(),
            }),
        };
        assert!(down.exists(id).await.is_err());
    }

    #[tokio::test]
    async fn validate_and_fetch_rejects_bad_ids_without_a_call() {
        let gateway = ScriptedAuthors { outcome: Ok(author()) };
        assert_eq!(
            gateway.validate_and_fetch(0).await,
            Err(AuthorsError::InvalidId(0))
        );
        assert_eq!(
            gateway.validate_and_fetch(-3).await,
            Err(AuthorsError::InvalidId(-3))
        );
        assert!(gateway.validate_and_fetch(7).await.is_ok());
    }
}
