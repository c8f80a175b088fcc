use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ApiResponse;
use crate::domain::errors::CatalogError;

impl From<&CatalogError> for StatusCode {
    fn from(err: &CatalogError) -> Self {
        match err {
            CatalogError::Validation { .. } => StatusCode::BAD_REQUEST,
            CatalogError::Conflict { .. } => StatusCode::CONFLICT,
            CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
            CatalogError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            CatalogError::Forbidden { .. } => StatusCode::FORBIDDEN,
            CatalogError::Media { .. } => StatusCode::BAD_GATEWAY,
            CatalogError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Raw detail of an internal error, attached to the response so that a
/// development-only layer can reveal it
#[derive(Debug, Clone)]
pub struct InternalErrorDetail {
    pub message: String,
    pub detail: String,
}

/// Terminal error type of every handler and extractor
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

impl From<Vec<crate::domain::errors::FieldError>> for ApiError {
    fn from(fields: Vec<crate::domain::errors::FieldError>) -> Self {
        ApiError(CatalogError::from(fields))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self.0);

        match self.0 {
            CatalogError::Validation { message, fields } => {
                let error = (!fields.is_empty()).then(|| {
                    fields
                        .iter()
                        .map(|f| f.message.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                });
                (status, Json(ApiResponse::failure(message, error))).into_response()
            }
            err if err.is_internal() => {
                tracing::error!(error = %err, status = status.as_u16(), "Request failed");

                let message = match err {
                    CatalogError::Media { .. } => "Media service error",
                    _ => "Internal server error",
                };
                let mut response =
                    (status, Json(ApiResponse::failure(message, None))).into_response();
                response.extensions_mut().insert(InternalErrorDetail {
                    message: message.to_string(),
                    detail: err.to_string(),
                });
                response
            }
            err => (status, Json(ApiResponse::failure(err.to_string(), None))).into_response(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
