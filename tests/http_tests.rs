mod common;

use axum::http::StatusCode;
use axum_test::{
    multipart::{MultipartForm, Part},
    TestServer,
};
use catalog_server::{
    adapters::inbound::http::{Environment, HttpConfig, RateLimitConfig},
    app::{AppBuilder, AppDependencies},
};
use common::{test_app, test_auth_settings, RecordingMediaStore};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};

fn server_with(media: Arc<RecordingMediaStore>) -> TestServer {
    TestServer::new(test_app(media).router()).unwrap()
}

fn server_with_config(media: Arc<RecordingMediaStore>, http: HttpConfig) -> TestServer {
    let app = AppBuilder::new()
        .with_auth_settings(test_auth_settings())
        .with_http_config(http)
        .build_with(AppDependencies::in_memory(media))
        .unwrap();
    TestServer::new(app.router()).unwrap()
}

fn product_form(name: &str, price: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name)
        .add_text("shortDescription", "Short")
        .add_text("detailedDescription", "A longer description")
        .add_text("price", price)
        .add_text("originalPrice", "99.99")
}

fn png(name: &str) -> Part {
    Part::bytes(b"\x89PNG fake".to_vec())
        .file_name(name)
        .mime_type("image/png")
}

async fn create(server: &TestServer, form: MultipartForm) -> Value {
    let response = server.post("/api/v1/product").multipart(form).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
async fn test_multipart_create_and_fetch() {
    let media = Arc::new(RecordingMediaStore::new());
    let server = server_with(media.clone());

    let form = product_form("Linen Shirt", "49.5")
        .add_text("tag", "Women")
        .add_text("colors", "c1,Red")
        .add_text("colors", "Blue")
        .add_part("images", png("front.png"))
        .add_part("images", png("back.png"));
    let product = create(&server, form).await;

    assert_eq!(product["name"], "Linen Shirt");
    assert_eq!(product["price"], 49.5);
    assert_eq!(product["tag"], "women");
    assert_eq!(product["images"].as_array().unwrap().len(), 2);
    assert_eq!(product["images"][0]["rank"], 1);
    assert_eq!(product["colors"].as_array().unwrap().len(), 2);
    assert_eq!(media.uploaded().len(), 2);

    let id = product["id"].as_str().unwrap();
    let fetched = server.get(&format!("/api/v1/product/{}", id)).await;
    fetched.assert_status_ok();
    let body: Value = fetched.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["images"], product["images"]);
}

#[tokio::test]
async fn test_multipart_rejects_documents() {
    let media = Arc::new(RecordingMediaStore::new());
    let server = server_with(media.clone());

    let form = product_form("Manual", "5").add_part(
        "images",
        Part::bytes(b"%PDF".to_vec())
            .file_name("manual.pdf")
            .mime_type("application/pdf"),
    );
    let response = server.post("/api/v1/product").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
    assert!(media.uploaded().is_empty());
}

#[tokio::test]
async fn test_missing_fields_are_reported() {
    let server = server_with(Arc::new(RecordingMediaStore::new()));

    let form = MultipartForm::new().add_text("name", "Nameless");
    let response = server.post("/api/v1/product").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Validation failed");
    assert!(body["error"].as_str().unwrap().contains("price"));
}

#[tokio::test]
async fn test_duplicate_product_name_is_conflict() {
    let server = server_with(Arc::new(RecordingMediaStore::new()));
    create(&server, product_form("Scarf", "10")).await;

    let response = server
        .post("/api/v1/product")
        .multipart(product_form("Scarf", "12"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_and_delete_over_http() {
    let media = Arc::new(RecordingMediaStore::new());
    let server = server_with(media.clone());
    let product = create(&server, product_form("Coat", "120").add_part("images", png("a.png"))).await;
    let id = product["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/product/{}", id);

    let updated = server
        .put(&path)
        .multipart(
            MultipartForm::new()
                .add_text("price", "99")
                .add_part("images", png("b.png"))
                .add_part("images", png("c.png")),
        )
        .await;
    updated.assert_status_ok();
    let body: Value = updated.json();
    assert_eq!(body["data"]["price"], 99.0);
    assert_eq!(body["data"]["name"], "Coat");
    let ranks: Vec<i64> = body["data"]["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["rank"].as_i64().unwrap())
        .collect();
    assert_eq!(ranks, vec![1, 2]);
    assert_eq!(media.deleted().len(), 1);

    server.delete(&path).await.assert_status_ok();
    assert_eq!(media.deleted().len(), 3);

    let gone = server.get(&path).await;
    gone.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(gone.json::<Value>()["message"], "Product not found");
}

#[tokio::test]
async fn test_invalid_product_id() {
    let server = server_with(Arc::new(RecordingMediaStore::new()));

    server
        .get("/api/v1/product/not-a-uuid")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listing_pagination_envelope() {
    let server = server_with(Arc::new(RecordingMediaStore::new()));
    for i in 0..12 {
        create(&server, product_form(&format!("Sock {}", i), "3")).await;
    }

    let response = server
        .get("/api/v1/product")
        .add_query_param("page", 2)
        .add_query_param("limit", 5)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["products"].as_array().unwrap().len(), 5);
    assert_eq!(data["total"], 12);
    assert_eq!(data["totalPages"], 3);
    assert_eq!(data["currentPage"], 2);
    assert_eq!(data["pageSize"], 5);

    server
        .get("/api/v1/product")
        .add_query_param("limit", 0)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let searched = server
        .get("/api/v1/product")
        .add_query_param("search", "SOCK 1")
        .await;
    // "Sock 1", "Sock 10" and "Sock 11"
    assert_eq!(searched.json::<Value>()["data"]["total"], 3);
}

#[tokio::test]
async fn test_tag_routes() {
    let server = server_with(Arc::new(RecordingMediaStore::new()));
    create(
        &server,
        product_form("Sun Hat", "25").add_text("tag", "women").add_text("colors", "Straw"),
    )
    .await;
    create(&server, product_form("Beach Bag", "60").add_text("tag", "Women")).await;

    let tagged = server.get("/api/v1/product/tag/WOMEN").await;
    tagged.assert_status_ok();
    let body: Value = tagged.json();
    let data = &body["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["pageSize"], 16);

    let missing = server.get("/api/v1/product/tag/men").await;
    missing.assert_status(StatusCode::NOT_FOUND);

    let storefront = server
        .get("/api/v1/product/women/products/tag")
        .add_query_param("tag", "women")
        .add_query_param("maxPrice", 25)
        .await;
    storefront.assert_status_ok();
    let body: Value = storefront.json();
    let data = &body["data"];
    assert_eq!(data["total"], 1);
    assert_eq!(data["products"][0]["name"], "Sun Hat");

    let empty = server
        .get("/api/v1/product/women/products/tag")
        .add_query_param("tag", "men")
        .await;
    empty.assert_status_ok();
    assert_eq!(empty.json::<Value>()["data"]["total"], 0);

    server
        .get("/api/v1/product/women/products/tag")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_category_route_filters_by_name() {
    let server = server_with(Arc::new(RecordingMediaStore::new()));
    let category = server
        .post("/api/v1/category")
        .json(&json!({ "name": "Summer Shoes" }))
        .await
        .json::<Value>()["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    create(
        &server,
        product_form("Loafer", "80").add_text("categoryId", category.as_str()),
    )
    .await;
    create(&server, product_form("Beret", "20")).await;

    let path = format!(
        "/api/v1/product/category/{}",
        urlencoding::encode("summer shoes")
    );
    let response = server.get(&path).await;
    response.assert_status_ok();
    let body: Value = response.json();
    let data = &body["data"];
    assert_eq!(data["total"], 1);
    assert_eq!(data["products"][0]["name"], "Loafer");
}

#[tokio::test]
async fn test_unknown_category_reference_is_rejected() {
    let media = Arc::new(RecordingMediaStore::new());
    let server = server_with(media.clone());

    let form = product_form("Ghost", "1")
        .add_text("categoryId", uuid::Uuid::new_v4().to_string())
        .add_part("images", png("ghost.png"));
    let response = server.post("/api/v1/product").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    // The uploaded image is removed again
    assert_eq!(media.deleted(), media.uploaded());
}

#[tokio::test]
async fn test_cart_products() {
    let server = server_with(Arc::new(RecordingMediaStore::new()));
    let a = create(&server, product_form("Mug", "8")).await;
    let b = create(&server, product_form("Plate", "12")).await;

    let response = server
        .post("/api/v1/product/cartproducts")
        .json(&json!({ "ids": [a["id"], b["id"], uuid::Uuid::new_v4().to_string()] }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 2);

    server
        .post("/api/v1/product/cartproducts")
        .json(&json!({ "ids": ["not-a-uuid"] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let empty = server
        .post("/api/v1/product/cartproducts")
        .json(&json!({ "ids": [] }))
        .await;
    empty.assert_status_ok();
    assert!(empty.json::<Value>()["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_media_failure_detail_only_in_development() {
    let media = Arc::new(RecordingMediaStore::new());
    media.fail_videos();
    let video = || {
        Part::bytes(b"fake video".to_vec())
            .file_name("clip.mp4")
            .mime_type("video/mp4")
    };

    let dev = server_with(media.clone());
    let response = dev
        .post("/api/v1/product")
        .multipart(product_form("Clip", "5").add_part("videos", video()))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["message"], "Media service error");
    assert!(body["error"].as_str().unwrap().contains("video upload rejected"));

    let prod = server_with_config(
        media,
        HttpConfig {
            environment: Environment::Production,
            ..Default::default()
        },
    );
    let response = prod
        .post("/api/v1/product")
        .multipart(product_form("Clip", "5").add_part("videos", video()))
        .await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["message"], "Media service error");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_rate_limit_rejects_after_ceiling() {
    let server = server_with_config(
        Arc::new(RecordingMediaStore::new()),
        HttpConfig {
            rate_limit: Some(RateLimitConfig {
                window: Duration::from_secs(60),
                max_requests: 3,
            }),
            ..Default::default()
        },
    );

    for _ in 0..3 {
        server.get("/api/v1/health").await.assert_status_ok();
    }

    let limited = server.get("/api/v1/health").await;
    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));

    let body: Value = limited.json();
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Too many requests from this IP, please try again later."
    );
}

#[tokio::test]
async fn test_json_body_limit() {
    let server = server_with_config(
        Arc::new(RecordingMediaStore::new()),
        HttpConfig {
            max_json_bytes: 64,
            ..Default::default()
        },
    );

    let response = server
        .post("/api/v1/category")
        .json(&json!({ "name": "x".repeat(200) }))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}
