use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{
    config::HttpConfig,
    handlers::{
        create_product, delete_product, get_cart_products, get_product, get_products_by_category,
        get_products_by_tag, get_storefront_products_by_tag, health, list_products, list_users,
        login, login_admin, profile, register, register_admin, route_not_found, taxonomy_routes,
        update_product,
    },
    middleware::{expose_error_details, rate_limit, security_headers, ClientRateLimiter},
};
use crate::{
    domain::models::TaxonomyKind,
    ports::services::{AuthService, ProductService, TaxonomyService},
};

/// Application state containing all services
#[derive(Clone)]
pub struct AppState {
    pub product_service: Arc<dyn ProductService>,
    pub taxonomy_service: Arc<dyn TaxonomyService>,
    pub auth_service: Arc<dyn AuthService>,
    pub config: Arc<HttpConfig>,
}

/// Create the main application router with all endpoints under `/api/v1`
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut api = Router::new()
        .nest("/product", create_product_router(&config))
        .nest("/category", taxonomy_routes(TaxonomyKind::Category))
        .nest("/subCategory", taxonomy_routes(TaxonomyKind::SubCategory))
        .nest("/size", taxonomy_routes(TaxonomyKind::Size))
        .nest("/color", taxonomy_routes(TaxonomyKind::Color))
        .nest("/quality", taxonomy_routes(TaxonomyKind::Quality))
        .nest("/auth", create_auth_router())
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_json_bytes));

    if let Some(limits) = config.rate_limit {
        api = api.layer(middleware::from_fn_with_state(
            ClientRateLimiter::new(limits),
            rate_limit,
        ));
    }

    let mut router = Router::new()
        .nest("/api/v1", api)
        .fallback(route_not_found)
        .with_state(state);

    if config.environment.is_development() {
        router = router.layer(middleware::from_fn(expose_error_details));
    }

    router
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(&config.cors_origin))
        .layer(TraceLayer::new_for_http())
}

/// Product routes; multipart writes get the larger upload body limit
pub fn create_product_router(config: &HttpConfig) -> Router<AppState> {
    let upload_limit = DefaultBodyLimit::max(config.max_upload_bytes);

    Router::new()
        .route(
            "/",
            get(list_products).post(create_product.layer(upload_limit)),
        )
        .route("/tag/{tag}", get(get_products_by_tag))
        .route("/cartproducts", post(get_cart_products))
        .route("/category/{category}", get(get_products_by_category))
        .route("/women/products/tag", get(get_storefront_products_by_tag))
        .route(
            "/{id}",
            get(get_product)
                .put(update_product.layer(upload_limit))
                .delete(delete_product),
        )
}

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/admin/register", post(register_admin))
        .route("/admin/login", post(login_admin))
        .route("/profile", get(profile))
        .route("/users", get(list_users))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!(origin = %origin, "Invalid CORS origin, cross-origin requests will be refused");
            layer
        }
    }
}
