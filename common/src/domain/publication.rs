use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AuthorId, PublicationDescription, PublicationId, PublicationTitle};

/// Review lifecycle of a publication. A record is created in `Draft` and
/// moves between states only through a transition policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationStatus {
    Draft,
    InReview,
    Approved,
    Published,
    Rejected,
}

impl PublicationStatus {
    pub const ALL: [PublicationStatus; 5] = [
        PublicationStatus::Draft,
        PublicationStatus::InReview,
        PublicationStatus::Approved,
        PublicationStatus::Published,
        PublicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "DRAFT",
            PublicationStatus::InReview => "IN_REVIEW",
            PublicationStatus::Approved => "APPROVED",
            PublicationStatus::Published => "PUBLISHED",
            PublicationStatus::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for PublicationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(PublicationStatus::Draft),
            "IN_REVIEW" => Ok(PublicationStatus::InReview),
            "APPROVED" => Ok(PublicationStatus::Approved),
            "PUBLISHED" => Ok(PublicationStatus::Published),
            "REJECTED" => Ok(PublicationStatus::Rejected),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A publication record as stored by the persistence layer.
///
/// Title, description and author reference are validated newtypes, so a
/// constructed record satisfies the field invariants by construction.
/// `published_date` is set the first time the record reaches `Published`
/// and is never cleared by a later transition away from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub id: PublicationId,
    pub title: PublicationTitle,
    pub description: PublicationDescription,
    pub author_id: AuthorId,
    pub status: PublicationStatus,
    pub review_comments: Option<String>,
    pub published_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn title_bounds_are_enforced() {
        assert!(PublicationTitle::try_new("ab").is_err());
        assert!(PublicationTitle::try_new("  ab  ").is_err());
        assert!(PublicationTitle::try_new("abc").is_ok());
        assert!(PublicationTitle::try_new("x".repeat(200)).is_ok());
        assert!(PublicationTitle::try_new("x".repeat(201)).is_err());
    }

    #[test]
    fn description_bounds_are_enforced() {
        assert!(PublicationDescription::try_new("too short").is_err());
        assert!(PublicationDescription::try_new("long enough text").is_ok());
        assert!(PublicationDescription::try_new("x".repeat(5000)).is_ok());
        assert!(PublicationDescription::try_new("x".repeat(5001)).is_err());
    }

    #[test]
    fn author_id_must_be_positive() {
        assert!(AuthorId::try_new(0).is_err());
        assert!(AuthorId::try_new(-7).is_err());
        assert!(AuthorId::try_new(1).is_ok());
    }

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in PublicationStatus::ALL {
            assert_eq!(PublicationStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(PublicationStatus::from_str("ARCHIVED").is_err());
    }
}
