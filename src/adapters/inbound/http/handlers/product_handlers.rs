use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    adapters::inbound::http::{
        dto::{
            ApiResponse, CartProductsDto, ListProductsQuery, PagedProductsDto, ProductDto,
            StorefrontQuery,
        },
        error::{ApiError, ApiResult},
        middleware::{ProductForm, ValidatedJson},
        router::AppState,
    },
    domain::{
        errors::{CatalogError, FieldError},
        models::Pagination,
    },
};

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| vec![FieldError::new("id", "Invalid product id")].into())
}

fn pagination(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Result<Pagination, ApiError> {
    Pagination::new(page, limit, default_limit).map_err(|e| vec![e].into())
}

/// Handle product creation from a multipart form
pub async fn create_product(
    State(state): State<AppState>,
    form: ProductForm,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProductDto>>)> {
    let (request, files) = form.into_create_request()?;
    let product = state.product_service.create_product(request, files).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Product created successfully", product.into())),
    ))
}

/// Handle the generic product listing
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Json<ApiResponse<PagedProductsDto>>> {
    let pagination = pagination(query.page, query.limit, Pagination::DEFAULT_LIMIT)?;
    let page = state
        .product_service
        .list_products(query.filter(), pagination)
        .await?;

    Ok(Json(ApiResponse::success(
        "Products retrieved successfully",
        page.into(),
    )))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ProductDto>>> {
    let product = state.product_service.get_product(parse_id(&id)?).await?;

    Ok(Json(ApiResponse::success(
        "Product retrieved successfully",
        product.into(),
    )))
}

/// Handle a partial product update from a multipart form
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ProductForm,
) -> ApiResult<Json<ApiResponse<ProductDto>>> {
    let id = parse_id(&id)?;
    let (request, files) = form.into_update_request()?;
    let product = state
        .product_service
        .update_product(id, request, files)
        .await?;

    Ok(Json(ApiResponse::success(
        "Product updated successfully",
        product.into(),
    )))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.product_service.delete_product(parse_id(&id)?).await?;

    Ok(Json(ApiResponse::ok("Product deleted successfully")))
}

/// Products carrying a tag; an empty result is reported as not found
pub async fn get_products_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<StorefrontQuery>,
) -> ApiResult<Json<ApiResponse<PagedProductsDto>>> {
    let pagination = pagination(query.page, query.limit, Pagination::STOREFRONT_LIMIT)?;
    let page = state
        .product_service
        .get_by_tag(&tag, query.filter(), pagination)
        .await?;

    if page.total == 0 {
        return Err(CatalogError::not_found(format!("No products found with tag '{}'", tag)).into());
    }

    Ok(Json(ApiResponse::success(
        "Products retrieved successfully",
        page.into(),
    )))
}

/// Storefront listing for a tag given in the query string
pub async fn get_storefront_products_by_tag(
    State(state): State<AppState>,
    Query(query): Query<StorefrontQuery>,
) -> ApiResult<Json<ApiResponse<PagedProductsDto>>> {
    let tag = query
        .tag
        .clone()
        .ok_or_else(|| ApiError::from(vec![FieldError::required("tag")]))?;
    let pagination = pagination(query.page, query.limit, Pagination::STOREFRONT_LIMIT)?;

    let page = state
        .product_service
        .get_by_tag(&tag, query.filter(), pagination)
        .await?;

    Ok(Json(ApiResponse::success(
        "Products retrieved successfully",
        page.into(),
    )))
}

pub async fn get_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<StorefrontQuery>,
) -> ApiResult<Json<ApiResponse<PagedProductsDto>>> {
    let pagination = pagination(query.page, query.limit, Pagination::STOREFRONT_LIMIT)?;
    let page = state
        .product_service
        .get_by_category(&category, query.filter(), pagination)
        .await?;

    Ok(Json(ApiResponse::success(
        "Products retrieved successfully",
        page.into(),
    )))
}

/// Batch fetch for a shopping cart; unknown ids are skipped
pub async fn get_cart_products(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CartProductsDto>,
) -> ApiResult<Json<ApiResponse<Vec<ProductDto>>>> {
    let ids = body.parse_ids()?;
    let products = state.product_service.get_cart_products(&ids).await?;

    Ok(Json(ApiResponse::success(
        "Cart products retrieved successfully",
        products.into_iter().map(Into::into).collect(),
    )))
}
