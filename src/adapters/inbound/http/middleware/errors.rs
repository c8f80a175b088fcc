use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::inbound::http::{dto::ApiResponse, error::InternalErrorDetail};

/// Development-only layer that puts the raw detail of internal errors into
/// the envelope's `error` field
pub async fn expose_error_details(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    let Some(detail) = response.extensions().get::<InternalErrorDetail>().cloned() else {
        return response;
    };

    let status = response.status();
    (
        status,
        Json(ApiResponse::failure(detail.message, Some(detail.detail))),
    )
        .into_response()
}
