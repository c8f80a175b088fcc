use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    adapters::inbound::http::{
        dto::{ApiResponse, CreateTaxonomyDto, TaxonomyDetailsDto, TaxonomyDto, UpdateTaxonomyDto},
        error::{ApiError, ApiResult},
        middleware::ValidatedJson,
        router::AppState,
    },
    domain::{errors::FieldError, models::TaxonomyKind},
};

fn parse_id(kind: TaxonomyKind, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        vec![FieldError::new(
            "id",
            format!("Invalid {} id", kind.label().to_lowercase()),
        )]
        .into()
    })
}

pub async fn create_entry(
    kind: TaxonomyKind,
    state: AppState,
    dto: CreateTaxonomyDto,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaxonomyDto>>)> {
    let entry = state.taxonomy_service.create(kind, dto.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            format!("{} created successfully", kind.label()),
            entry.into(),
        )),
    ))
}

pub async fn list_entries(
    kind: TaxonomyKind,
    state: AppState,
) -> ApiResult<Json<ApiResponse<Vec<TaxonomyDto>>>> {
    let entries = state.taxonomy_service.list(kind).await?;

    Ok(Json(ApiResponse::success(
        format!("{} list retrieved successfully", kind.label()),
        entries.into_iter().map(Into::into).collect(),
    )))
}

pub async fn get_entry(
    kind: TaxonomyKind,
    state: AppState,
    id: String,
) -> ApiResult<Json<ApiResponse<TaxonomyDetailsDto>>> {
    let details = state.taxonomy_service.get(kind, parse_id(kind, &id)?).await?;

    Ok(Json(ApiResponse::success(
        format!("{} retrieved successfully", kind.label()),
        details.into(),
    )))
}

pub async fn list_entries_by_category(
    kind: TaxonomyKind,
    state: AppState,
    category_id: String,
) -> ApiResult<Json<ApiResponse<Vec<TaxonomyDto>>>> {
    let category_id = parse_id(TaxonomyKind::Category, &category_id)?;
    let entries = state
        .taxonomy_service
        .list_by_category(kind, category_id)
        .await?;

    Ok(Json(ApiResponse::success(
        format!("{} list retrieved successfully", kind.label()),
        entries.into_iter().map(Into::into).collect(),
    )))
}

pub async fn update_entry(
    kind: TaxonomyKind,
    state: AppState,
    id: String,
    dto: UpdateTaxonomyDto,
) -> ApiResult<Json<ApiResponse<TaxonomyDto>>> {
    let entry = state
        .taxonomy_service
        .update(kind, parse_id(kind, &id)?, dto.into())
        .await?;

    Ok(Json(ApiResponse::success(
        format!("{} updated successfully", kind.label()),
        entry.into(),
    )))
}

pub async fn delete_entry(
    kind: TaxonomyKind,
    state: AppState,
    id: String,
) -> ApiResult<Json<ApiResponse<()>>> {
    state
        .taxonomy_service
        .delete(kind, parse_id(kind, &id)?)
        .await?;

    Ok(Json(ApiResponse::ok(format!(
        "{} deleted successfully",
        kind.label()
    ))))
}

/// CRUD routes for one taxonomy kind, mounted under its own prefix
pub fn taxonomy_routes(kind: TaxonomyKind) -> Router<AppState> {
    let mut router = Router::new()
        .route(
            "/",
            get(move |State(state): State<AppState>| list_entries(kind, state)).post(
                move |State(state): State<AppState>,
                      ValidatedJson(dto): ValidatedJson<CreateTaxonomyDto>| {
                    create_entry(kind, state, dto)
                },
            ),
        )
        .route(
            "/{id}",
            get(move |State(state): State<AppState>, Path(id): Path<String>| {
                get_entry(kind, state, id)
            })
            .put(
                move |State(state): State<AppState>,
                      Path(id): Path<String>,
                      ValidatedJson(dto): ValidatedJson<UpdateTaxonomyDto>| {
                    update_entry(kind, state, id, dto)
                },
            )
            .delete(move |State(state): State<AppState>, Path(id): Path<String>| {
                delete_entry(kind, state, id)
            }),
        );

    if kind.parent_kind() == Some(TaxonomyKind::Category) {
        router = router.route(
            "/category/{id}",
            get(move |State(state): State<AppState>, Path(id): Path<String>| {
                list_entries_by_category(kind, state, id)
            }),
        );
    }

    router
}
