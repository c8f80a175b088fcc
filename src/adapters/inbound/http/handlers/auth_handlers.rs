use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    adapters::inbound::http::{
        dto::{ApiResponse, AuthResponseDto, LoginDto, RegisterDto, UserDto},
        error::ApiResult,
        middleware::{AdminUser, AuthUser, MaybeAuthUser, ValidatedJson},
        router::AppState,
    },
    domain::{errors::CatalogError, models::Role},
};

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterDto>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    let session = state.auth_service.register(dto.into(), Role::User).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User registered successfully",
            session.into(),
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> ApiResult<Json<ApiResponse<AuthResponseDto>>> {
    let session = state.auth_service.login(dto.into()).await?;

    Ok(Json(ApiResponse::success("Login successful", session.into())))
}

/// Register an admin. The first admin may register openly; after that only
/// an admin can add another.
pub async fn register_admin(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    ValidatedJson(dto): ValidatedJson<RegisterDto>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthResponseDto>>)> {
    let caller_is_admin = caller.as_ref().is_some_and(|c| c.is_admin());
    if !caller_is_admin {
        let admins = state.auth_service.list_users(Some(Role::Admin)).await?;
        if !admins.is_empty() {
            return Err(CatalogError::forbidden("Admin access required").into());
        }
    }

    let session = state.auth_service.register(dto.into(), Role::Admin).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Admin registered successfully",
            session.into(),
        )),
    ))
}

pub async fn login_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginDto>,
) -> ApiResult<Json<ApiResponse<AuthResponseDto>>> {
    let session = state.auth_service.login_admin(dto.into()).await?;

    Ok(Json(ApiResponse::success(
        "Admin login successful",
        session.into(),
    )))
}

pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ApiResponse<UserDto>>> {
    let user = state.auth_service.profile(user.user_id).await?;

    Ok(Json(ApiResponse::success(
        "Profile retrieved successfully",
        user.into(),
    )))
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<UsersQuery>,
) -> ApiResult<Json<ApiResponse<Vec<UserDto>>>> {
    let role = match query.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => Some(Role::parse(&raw.to_ascii_uppercase()).ok_or_else(|| {
            CatalogError::validation(format!("Unknown role '{}'", raw))
        })?),
        None => None,
    };
    let users = state.auth_service.list_users(role).await?;

    Ok(Json(ApiResponse::success(
        "Users retrieved successfully",
        users.into_iter().map(Into::into).collect(),
    )))
}
