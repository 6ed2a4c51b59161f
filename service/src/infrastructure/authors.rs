use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use serde::Deserialize;

use publications_common::AuthorId;

use crate::domain::authors::{Author, AuthorsError, AuthorsGateway, AuthorsPage};
use crate::infrastructure::settings::AuthorsSettings;

/// Backoff calculator for the retry loop: linear in the attempt number.
/// Kept separate from the loop so the waiting policy can be reasoned about
/// (and tested) without any I/O.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base_delay: Duration,
}

impl Backoff {
    pub fn new(base_delay: Duration) -> Self {
        Self { base_delay }
    }

    /// Delay before the retry following `attempt` (1-indexed), i.e.
    /// `base_delay × attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

#[derive(Debug, Clone)]
pub struct AuthorsClientConfig {
    pub base_url: String,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for AuthorsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&AuthorsSettings> for AuthorsClientConfig {
    fn from(settings: &AuthorsSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            max_retries: settings.max_retries,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

/// HTTP adapter for the authors service.
///
/// Owns the resilience policy for the author lookup: per-call timeout,
/// transient-failure retries with linear backoff, and failure
/// classification. A 404 is a definitive answer and is never retried;
/// network errors, timeouts and 5xx responses are transient; any other
/// status is a protocol failure and also not retried.
#[derive(Debug, Clone)]
pub struct AuthorsServiceClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
    backoff: Backoff,
}

/// Outcome of a single fetch attempt, classified for the retry loop.
enum FetchFailure {
    /// The remote definitively reported the author does not exist.
    Absent,
    /// Worth retrying: connection failure or 5xx.
    Transient(String),
    /// Worth retrying, but reported separately after exhaustion.
    TimedOut(String),
    /// Not worth retrying: unexpected status or malformed body.
    Fatal(String),
}

/// The authors service returns the author either bare or wrapped in an
/// `{"author": ...}` envelope depending on the endpoint version.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorPayload {
    Wrapped { author: Author },
    Bare(Author),
}

impl AuthorPayload {
    fn into_author(self) -> Author {
        match self {
            AuthorPayload::Wrapped { author } => author,
            AuthorPayload::Bare(author) => author,
        }
    }
}

impl AuthorsServiceClient {
    pub fn new(config: AuthorsClientConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build authors service HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            backoff: Backoff::new(config.retry_delay),
        })
    }

    async fn fetch_once(&self, id: i64) -> Result<Author, FetchFailure> {
        let url = format!("{}/authors/{}", self.base_url, id);
        let response = self.http.get(&url).send().await.map_err(classify_send_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchFailure::Absent);
        }
        if status.is_server_error() {
            return Err(FetchFailure::Transient(format!(
                "authors service returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(FetchFailure::Fatal(format!(
                "authors service returned {status}"
            )));
        }

        let payload: AuthorPayload = response
            .json()
            .await
            .map_err(|error| FetchFailure::Fatal(format!("malformed author payload: {error}")))?;
        Ok(payload.into_author())
    }

    async fn fetch_with_retries(&self, id: i64) -> Result<Author, AuthorsError> {
        let mut last_failure = String::new();
        let mut timed_out = false;

        for attempt in 1..=self.max_retries {
            match self.fetch_once(id).await {
                Ok(author) => return Ok(author),
                Err(FetchFailure::Absent) => return Err(AuthorsError::NotFound(id)),
                Err(FetchFailure::Fatal(detail)) => return Err(AuthorsError::Unexpected(detail)),
                Err(FetchFailure::Transient(detail)) => {
                    last_failure = detail;
                    timed_out = false;
                }
                Err(FetchFailure::TimedOut(detail)) => {
                    last_failure = detail;
                    timed_out = true;
                }
            }

            if attempt < self.max_retries {
                let wait = self.backoff.delay_for(attempt);
                tracing::warn!(
                    author_id = id,
                    attempt,
                    max_retries = self.max_retries,
                    wait_ms = wait.as_millis() as u64,
                    error = %last_failure,
                    "retrying author fetch"
                );
                tokio::time::sleep(wait).await;
            }
        }

        if timed_out {
            Err(AuthorsError::Timeout { id, attempts: self.max_retries })
        } else {
            Err(AuthorsError::Unavailable {
                id,
                attempts: self.max_retries,
                reason: last_failure,
            })
        }
    }
}

fn classify_send_error(error: reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::TimedOut(error.to_string())
    } else {
        FetchFailure::Transient(error.to_string())
    }
}

impl AuthorsGateway for AuthorsServiceClient {
    async fn fetch(&self, id: AuthorId) -> Result<Author, AuthorsError> {
        self.fetch_with_retries(id.into_inner()).await
    }

    // Listing is informational; a single classified failure, no retry.
    async fn list(&self, page: i64, limit: i64) -> Result<AuthorsPage, AuthorsError> {
        let url = format!("{}/authors", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await
            .map_err(|error| {
                AuthorsError::Unexpected(format!("failed to fetch authors list: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorsError::Unexpected(format!(
                "authors list request returned {status}"
            )));
        }

        response.json().await.map_err(|error| {
            AuthorsError::Unexpected(format!("malformed authors list payload: {error}"))
        })
    }

    // Health probes must be fast: one attempt, one generic error.
    async fn health(&self) -> Result<(), AuthorsError> {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(()),
            _ => Err(AuthorsError::HealthCheckFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::authors::AuthorsGateway;

    fn client_for(server: &MockServer, max_retries: u32, base_delay_ms: u64) -> AuthorsServiceClient {
        AuthorsServiceClient::new(AuthorsClientConfig {
            base_url: server.uri(),
            max_retries,
            retry_delay: Duration::from_millis(base_delay_ms),
            timeout: Duration::from_millis(500),
        })
        .unwrap()
    }

    fn author_body() -> serde_json::Value {
        json!({ "id": 7, "name": "Ada Lovelace", "email": "ada@example.com" })
    }

    fn author_id(raw: i64) -> AuthorId {
        AuthorId::try_new(raw).unwrap()
    }

    #[test]
    fn backoff_is_linear_in_the_attempt() {
        let backoff = Backoff::new(Duration::from_millis(1000));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(1000));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(2000));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn definitive_absence_fails_after_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors/7"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, 3, 10);
        let error = client.fetch(author_id(7)).await.unwrap_err();

        assert_eq!(error, AuthorsError::NotFound(7));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors/7"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/authors/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(author_body()))
            .mount(&server)
            .await;

        let base_delay = 40u64;
        let client = client_for(&server, 3, base_delay);
        let started = Instant::now();
        let author = client.fetch(author_id(7)).await.unwrap();

        assert_eq!(author.name, "Ada Lovelace");
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
        // two failed attempts waited base*1 + base*2
        assert!(started.elapsed() >= Duration::from_millis(base_delay * 3));
    }

    #[tokio::test]
    async fn exhausted_retries_aggregate_the_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors/7"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, 3, 10);
        let error = client.fetch(author_id(7)).await.unwrap_err();

        match error {
            AuthorsError::Unavailable { id, attempts, reason } => {
                assert_eq!(id, 7);
                assert_eq!(attempts, 3);
                assert!(reason.contains("500"));
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn slow_responses_classify_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(author_body())
                    .set_delay(Duration::from_millis(900)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, 2, 10);
        let error = client.fetch(author_id(7)).await.unwrap_err();

        assert_eq!(error, AuthorsError::Timeout { id: 7, attempts: 2 });
    }

    #[tokio::test]
    async fn unexpected_statuses_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors/7"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server, 3, 10);
        let error = client.fetch(author_id(7)).await.unwrap_err();

        assert!(matches!(error, AuthorsError::Unexpected(_)));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn both_author_payload_shapes_parse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors/7"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "author": author_body() })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/authors/8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(author_body()))
            .mount(&server)
            .await;

        let client = client_for(&server, 1, 10);
        assert!(client.fetch(author_id(7)).await.is_ok());
        assert!(client.fetch(author_id(8)).await.is_ok());
    }

    #[tokio::test]
    async fn listing_passes_pagination_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/authors"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 6, "page": 2, "pages": 2, "authors": [author_body()]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, 1, 10);
        let page = client.list(2, 5).await.unwrap();

        assert_eq!(page.total, 6);
        assert_eq!(page.authors.len(), 1);
    }

    #[tokio::test]
    async fn health_collapses_failures_into_one_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server, 3, 10);
        assert_eq!(client.health().await, Err(AuthorsError::HealthCheckFailed));
        // no retry for health probes
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn health_succeeds_on_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
            .mount(&server)
            .await;

        let client = client_for(&server, 3, 10);
        assert_eq!(client.health().await, Ok(()));
    }
}
