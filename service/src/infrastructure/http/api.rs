use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::error::ServiceError;

// ApiSuccess is a wrapper around a response that includes a status code.

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub(crate) fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ApiError carries a classified service error to the boundary. The
// response status and machine tag come from the error kind alone, via the
// lookup below — message text is never inspected.

#[derive(Debug, Clone)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self(error)
    }
}

fn classify(error: &ServiceError) -> (StatusCode, &'static str) {
    match error {
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ServiceError::InvalidTransition { .. } => (StatusCode::BAD_REQUEST, "INVALID_TRANSITION"),
        ServiceError::InvalidState(_) => (StatusCode::BAD_REQUEST, "INVALID_STATE"),
        ServiceError::ServiceUnavailable(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
        }
        ServiceError::GatewayTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
        ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Detail of unclassified and remote failures stays in the logs;
        // their Display is already a generic message.
        match &self.0 {
            ServiceError::Internal(detail) => tracing::error!("{detail}"),
            ServiceError::ServiceUnavailable(detail) | ServiceError::GatewayTimeout(detail) => {
                tracing::warn!("{detail}")
            }
            _ => {}
        }

        let (status, tag) = classify(&self.0);
        (
            status,
            Json(ApiResponseBody::new_error(status, tag, self.0.to_string())),
        )
            .into_response()
    }
}

// Generic response structure shared by all API error responses.

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    pub status_code: u16,
    pub data: T,
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, tag: &'static str, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { kind: tag, message },
        }
    }
}

/// The response data format for all error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}
