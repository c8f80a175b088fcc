use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::adapters::inbound::http::{
    dto::{ApiResponse, HealthDto},
    router::AppState,
};

/// Liveness check
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthDto>> {
    Json(ApiResponse::success(
        "Server is running",
        HealthDto {
            status: "OK".to_string(),
            timestamp: Utc::now(),
            environment: state.config.environment.as_str().to_string(),
        },
    ))
}

/// Envelope for requests that match no route
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(
            format!("Route {} not found", uri.path()),
            None,
        )),
    )
}
