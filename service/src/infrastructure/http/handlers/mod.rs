use axum::http::StatusCode;

pub mod publications;

// liveness probe; readiness of the authors dependency is checked at startup
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
