use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    adapters::inbound::http::{dto::ApiResponse, error::ApiError},
    domain::errors::{CatalogError, Validate},
};

/// JSON body that has been deserialized and passed `Validate`.
///
/// Malformed bodies and failed validation are rejected with a 400 envelope
/// before the handler runs; oversized bodies get a 413 envelope.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    return (
                        StatusCode::PAYLOAD_TOO_LARGE,
                        Json(ApiResponse::failure("Request body too large", None)),
                    )
                        .into_response();
                }
                ApiError::from(CatalogError::validation(format!(
                    "Invalid JSON body: {}",
                    rejection.body_text()
                )))
                .into_response()
            })?;

        value
            .validate()
            .map_err(|fields| ApiError::from(fields).into_response())?;
        Ok(ValidatedJson(value))
    }
}
