use std::sync::Arc;

use chrono::Utc;

use publications_common::{
    AuthorId, Publication, PublicationDescription, PublicationDescriptionError, PublicationId,
    PublicationStatus, PublicationTitle, PublicationTitleError, SYSTEM_ACTOR, TransitionContext,
    TransitionPolicy,
};

use crate::domain::authors::{Author, AuthorsGateway};
use crate::domain::error::ServiceError;
use crate::domain::repository::{
    NewPublication, PageRequest, PublicationChanges, PublicationFilter, PublicationPage,
    PublicationRepository, StatusCount,
};

/// Request to create a publication, as received from the boundary.
#[derive(Debug, Clone)]
pub struct CreatePublication {
    pub title: String,
    pub description: String,
    pub author_id: i64,
    pub review_comments: Option<String>,
}

/// Field update for a publication. Status is deliberately absent: it can
/// only change through [`PublicationService::change_status`].
#[derive(Debug, Clone, Default)]
pub struct UpdatePublication {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author_id: Option<i64>,
    pub review_comments: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilter {
    pub status: Option<PublicationStatus>,
    pub author_id: Option<i64>,
}

/// A publication enriched with the remote author projection.
#[derive(Debug, Clone)]
pub struct EnrichedPublication {
    pub publication: Publication,
    pub author: Author,
}

/// Owns the publication lifecycle: creation with remote author validation,
/// field updates, policy-guarded status transitions, the deletion guard and
/// listing. The transition policy is fixed at construction.
pub struct PublicationService<R, A> {
    repository: R,
    authors: A,
    policy: Arc<dyn TransitionPolicy>,
}

impl<R, A> PublicationService<R, A>
where
    R: PublicationRepository,
    A: AuthorsGateway,
{
    pub fn new(repository: R, authors: A, policy: Arc<dyn TransitionPolicy>) -> Self {
        Self { repository, authors, policy }
    }

    pub fn authors(&self) -> &A {
        &self.authors
    }

    /// Creates a publication in DRAFT. The author reference is validated
    /// remotely before anything is persisted, so a dangling reference never
    /// reaches the store.
    pub async fn create(
        &self,
        request: CreatePublication,
    ) -> Result<EnrichedPublication, ServiceError> {
        let author = self.authors.validate_and_fetch(request.author_id).await?;

        let new = NewPublication {
            title: parse_title(request.title)?,
            description: parse_description(request.description)?,
            // validate_and_fetch succeeded, so the raw id is positive
            author_id: AuthorId::try_new(request.author_id)
                .map_err(|_| ServiceError::Validation("Valid author ID is required".into()))?,
            status: PublicationStatus::Draft,
            review_comments: request.review_comments,
        };

        let publication = self.repository.create(new).await?;
        tracing::info!(id = %publication.id, author_id = request.author_id, "publication created");

        Ok(EnrichedPublication { publication, author })
    }

    /// Fetches a publication and enriches it with its author.
    pub async fn get(&self, id: PublicationId) -> Result<EnrichedPublication, ServiceError> {
        let publication = self.load(id).await?;
        let author = self.authors.fetch(publication.author_id).await?;
        Ok(EnrichedPublication { publication, author })
    }

    /// Filtered listing. An author filter is validated remotely first, so
    /// a dangling author reads as "author not found" rather than an
    /// ambiguous empty result.
    pub async fn list(
        &self,
        filter: ListFilter,
        page: PageRequest,
    ) -> Result<PublicationPage, ServiceError> {
        let mut repo_filter = PublicationFilter { status: filter.status, ..Default::default() };

        if let Some(raw) = filter.author_id {
            self.authors.validate_and_fetch(raw).await?;
            repo_filter.author_id = AuthorId::try_new(raw).ok();
        }

        Ok(self.repository.list(repo_filter, page).await?)
    }

    /// Updates non-status fields. A changed author reference is re-validated
    /// remotely; the status and publish date are never touched here.
    pub async fn update(
        &self,
        id: PublicationId,
        patch: UpdatePublication,
    ) -> Result<Publication, ServiceError> {
        let existing = self.load(id).await?;

        let mut changes = PublicationChanges::default();

        if let Some(raw) = patch.author_id {
            if raw != existing.author_id.into_inner() {
                self.authors.validate_and_fetch(raw).await?;
                changes.author_id = AuthorId::try_new(raw).ok();
            }
        }
        if let Some(title) = patch.title {
            changes.title = Some(parse_title(title)?);
        }
        if let Some(description) = patch.description {
            changes.description = Some(parse_description(description)?);
        }
        changes.review_comments = patch.review_comments;

        if changes.is_empty() {
            return Err(ServiceError::Validation("No fields to update".into()));
        }

        Ok(self.repository.update(id, changes).await?)
    }

    /// Applies a status transition after the policy has approved it. On a
    /// transition to PUBLISHED the publish date is stamped; it is never
    /// cleared afterwards. Non-empty context comments overwrite the stored
    /// review comments.
    pub async fn change_status(
        &self,
        id: PublicationId,
        target: PublicationStatus,
        context: TransitionContext,
    ) -> Result<Publication, ServiceError> {
        let existing = self.load(id).await?;

        self.policy
            .validate(existing.status, target, &context)
            .map_err(|denied| ServiceError::InvalidTransition {
                from: existing.status,
                to: target,
                reason: denied.reason,
            })?;

        let mut changes = PublicationChanges { status: Some(target), ..Default::default() };
        if target == PublicationStatus::Published {
            changes.published_date = Some(Utc::now());
        }
        changes.review_comments = context
            .comments
            .filter(|comments| !comments.trim().is_empty());

        let updated = self.repository.update(id, changes).await?;
        tracing::info!(id = %id, from = %existing.status, to = %target, "publication status changed");
        Ok(updated)
    }

    pub async fn submit_for_review(&self, id: PublicationId) -> Result<Publication, ServiceError> {
        self.change_status(id, PublicationStatus::InReview, TransitionContext::default())
            .await
    }

    pub async fn approve(
        &self,
        id: PublicationId,
        comments: Option<String>,
    ) -> Result<Publication, ServiceError> {
        let context = TransitionContext {
            comments,
            reviewer_id: Some(SYSTEM_ACTOR.to_string()),
            ..Default::default()
        };
        self.change_status(id, PublicationStatus::Approved, context).await
    }

    pub async fn reject(
        &self,
        id: PublicationId,
        reason: String,
    ) -> Result<Publication, ServiceError> {
        let context = TransitionContext {
            comments: Some(reason.clone()),
            rejection_reason: Some(reason),
            ..Default::default()
        };
        self.change_status(id, PublicationStatus::Rejected, context).await
    }

    pub async fn publish(&self, id: PublicationId) -> Result<Publication, ServiceError> {
        let context = TransitionContext {
            publisher_id: Some(SYSTEM_ACTOR.to_string()),
            ..Default::default()
        };
        self.change_status(id, PublicationStatus::Published, context).await
    }

    /// Deletes a publication. Only drafts may be deleted; anything past
    /// DRAFT has entered the review trail and must be rejected instead.
    pub async fn delete(&self, id: PublicationId) -> Result<(), ServiceError> {
        let existing = self.load(id).await?;

        if existing.status != PublicationStatus::Draft {
            return Err(ServiceError::InvalidState(
                "Can only delete publications in DRAFT status".into(),
            ));
        }

        Ok(self.repository.delete(id).await?)
    }

    pub async fn statistics(&self) -> Result<Vec<StatusCount>, ServiceError> {
        Ok(self.repository.count_by_status().await?)
    }

    async fn load(&self, id: PublicationId) -> Result<Publication, ServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Publication with ID {id} not found")))
    }
}

fn parse_title(raw: impl Into<String>) -> Result<PublicationTitle, ServiceError> {
    PublicationTitle::try_new(raw).map_err(|error| {
        ServiceError::Validation(match error {
            PublicationTitleError::NotEmptyViolated | PublicationTitleError::LenCharMinViolated => {
                "Publication title must be at least 3 characters long".into()
            }
            PublicationTitleError::LenCharMaxViolated => {
                "Publication title must be at most 200 characters long".into()
            }
        })
    })
}

fn parse_description(raw: impl Into<String>) -> Result<PublicationDescription, ServiceError> {
    PublicationDescription::try_new(raw).map_err(|error| {
        ServiceError::Validation(match error {
            PublicationDescriptionError::NotEmptyViolated
            | PublicationDescriptionError::LenCharMinViolated => {
                "Publication description must be at least 10 characters long".into()
            }
            PublicationDescriptionError::LenCharMaxViolated => {
                "Publication description must be at most 5000 characters long".into()
            }
        })
    })
}
