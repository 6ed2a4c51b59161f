use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use publications_common::{Publication, PublicationStatus};

use crate::domain::authors::Author;
use crate::domain::publications::EnrichedPublication;
use crate::domain::repository::{PublicationPage, StatusCount};

// Requests

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublicationRequest {
    pub title: String,
    pub description: String,
    pub author_id: i64,
    #[serde(default)]
    pub review_comments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePublicationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author_id: Option<i64>,
    pub review_comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPublicationsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<String>,
    pub author_id: Option<i64>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

// Responses

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author_id: i64,
    pub status: PublicationStatus,
    pub review_comments: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Publication> for PublicationResponse {
    fn from(publication: Publication) -> Self {
        Self {
            id: publication.id.0,
            title: publication.title.into_inner(),
            description: publication.description.into_inner(),
            author_id: publication.author_id.into_inner(),
            status: publication.status,
            review_comments: publication.review_comments,
            published_date: publication.published_date,
            created_at: publication.created_at,
            updated_at: publication.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub expertise: Option<String>,
    pub nationality: Option<String>,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            email: author.email,
            bio: author.bio,
            expertise: author.expertise,
            nationality: author.nationality,
        }
    }
}

/// Publication plus its remotely-fetched author, with an optional
/// operation message.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedPublicationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub publication: PublicationResponse,
    pub author: AuthorResponse,
}

impl EnrichedPublicationResponse {
    pub fn new(message: Option<&'static str>, enriched: EnrichedPublication) -> Self {
        Self {
            message,
            publication: enriched.publication.into(),
            author: enriched.author.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicationEnvelope {
    pub message: &'static str,
    pub publication: PublicationResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicationListResponse {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub publications: Vec<PublicationResponse>,
}

impl From<PublicationPage> for PublicationListResponse {
    fn from(page: PublicationPage) -> Self {
        Self {
            total: page.total,
            page: page.page,
            pages: page.pages,
            publications: page.publications.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsResponse {
    pub statistics: Vec<StatusCountResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountResponse {
    pub status: PublicationStatus,
    pub count: i64,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(entry: StatusCount) -> Self {
        Self { status: entry.status, count: entry.count }
    }
}
