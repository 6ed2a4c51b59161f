use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use publications_common::{PublicationId, PublicationStatus, TransitionContext};

use crate::domain::AppState;
use crate::domain::error::ServiceError;
use crate::domain::publications::{CreatePublication, ListFilter, UpdatePublication};
use crate::domain::repository::PageRequest;
use crate::infrastructure::http::api::{ApiError, ApiSuccess};
use crate::infrastructure::http::handlers::publications::dto::{
    ApproveRequest, CreatePublicationRequest, EnrichedPublicationResponse, ListPublicationsQuery,
    MessageResponse, PublicationEnvelope, PublicationListResponse, RejectRequest,
    StatisticsResponse, UpdatePublicationRequest, UpdateStatusRequest,
};

mod dto;

pub async fn create_publication<S: AppState>(
    State(state): State<S>,
    Json(body): Json<CreatePublicationRequest>,
) -> Result<ApiSuccess<EnrichedPublicationResponse>, ApiError> {
    let created = state
        .publications()
        .create(CreatePublication {
            title: body.title,
            description: body.description,
            author_id: body.author_id,
            review_comments: body.review_comments,
        })
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        EnrichedPublicationResponse::new(Some("Publication created successfully"), created),
    ))
}

pub async fn get_publication<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<EnrichedPublicationResponse>, ApiError> {
    let id = parse_publication_id(id)?;
    let enriched = state.publications().get(id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        EnrichedPublicationResponse::new(None, enriched),
    ))
}

pub async fn list_publications<S: AppState>(
    Query(query): Query<ListPublicationsQuery>,
    State(state): State<S>,
) -> Result<ApiSuccess<PublicationListResponse>, ApiError> {
    if query.page < 1 || query.limit < 1 {
        return Err(validation("Page and limit must be positive numbers"));
    }

    let status = query
        .status
        .map(|raw| parse_status(&raw))
        .transpose()?;

    let page = state
        .publications()
        .list(
            ListFilter { status, author_id: query.author_id },
            PageRequest { page: query.page, limit: query.limit },
        )
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, page.into()))
}

pub async fn update_publication<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    Json(body): Json<UpdatePublicationRequest>,
) -> Result<ApiSuccess<PublicationEnvelope>, ApiError> {
    let id = parse_publication_id(id)?;
    let publication = state
        .publications()
        .update(
            id,
            UpdatePublication {
                title: body.title,
                description: body.description,
                author_id: body.author_id,
                review_comments: body.review_comments,
            },
        )
        .await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        PublicationEnvelope {
            message: "Publication updated successfully",
            publication: publication.into(),
        },
    ))
}

pub async fn update_publication_status<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<ApiSuccess<PublicationEnvelope>, ApiError> {
    let id = parse_publication_id(id)?;
    let target = parse_status(&body.status)?;

    // The generic transition path carries comments only; guard fields are
    // populated by the named shortcut endpoints.
    let context = TransitionContext { comments: body.comments, ..Default::default() };
    let publication = state.publications().change_status(id, target, context).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        PublicationEnvelope {
            message: "Publication status updated successfully",
            publication: publication.into(),
        },
    ))
}

pub async fn submit_for_review<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<PublicationEnvelope>, ApiError> {
    let id = parse_publication_id(id)?;
    let publication = state.publications().submit_for_review(id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        PublicationEnvelope {
            message: "Publication submitted for review",
            publication: publication.into(),
        },
    ))
}

pub async fn approve_publication<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    body: Option<Json<ApproveRequest>>,
) -> Result<ApiSuccess<PublicationEnvelope>, ApiError> {
    let id = parse_publication_id(id)?;
    let comments = body.and_then(|Json(request)| request.comments);
    let publication = state.publications().approve(id, comments).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        PublicationEnvelope { message: "Publication approved", publication: publication.into() },
    ))
}

pub async fn reject_publication<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
    body: Option<Json<RejectRequest>>,
) -> Result<ApiSuccess<PublicationEnvelope>, ApiError> {
    let id = parse_publication_id(id)?;
    let reason = body
        .and_then(|Json(request)| request.reason)
        .ok_or_else(|| validation("Rejection reason is required"))?;
    let publication = state.publications().reject(id, reason).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        PublicationEnvelope { message: "Publication rejected", publication: publication.into() },
    ))
}

pub async fn publish_publication<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<PublicationEnvelope>, ApiError> {
    let id = parse_publication_id(id)?;
    let publication = state.publications().publish(id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        PublicationEnvelope { message: "Publication published", publication: publication.into() },
    ))
}

pub async fn delete_publication<S: AppState>(
    Path(id): Path<i64>,
    State(state): State<S>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    let id = parse_publication_id(id)?;
    state.publications().delete(id).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MessageResponse { message: "Publication deleted successfully" },
    ))
}

pub async fn publication_statistics<S: AppState>(
    State(state): State<S>,
) -> Result<ApiSuccess<StatisticsResponse>, ApiError> {
    let statistics = state.publications().statistics().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        StatisticsResponse { statistics: statistics.into_iter().map(Into::into).collect() },
    ))
}

fn parse_publication_id(raw: i64) -> Result<PublicationId, ApiError> {
    if raw <= 0 {
        return Err(validation("Invalid publication ID"));
    }
    Ok(PublicationId(raw))
}

fn parse_status(raw: &str) -> Result<PublicationStatus, ApiError> {
    PublicationStatus::from_str(&raw.to_uppercase())
        .map_err(|error| ApiError::from(ServiceError::Validation(error.to_string())))
}

fn validation(message: &str) -> ApiError {
    ApiError::from(ServiceError::Validation(message.to_string()))
}
