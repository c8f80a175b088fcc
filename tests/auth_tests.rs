mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use catalog_server::{
    adapters::outbound::persistence::InMemoryUserRepository,
    domain::{
        errors::CatalogError,
        models::{LoginRequest, RegisterRequest, Role},
    },
    ports::services::AuthService,
    services::AuthServiceImpl,
};
use common::{test_app, test_auth_settings, RecordingMediaStore};
use serde_json::{json, Value};
use std::sync::Arc;

fn auth_service() -> AuthServiceImpl {
    AuthServiceImpl::new(Arc::new(InMemoryUserRepository::new()), test_auth_settings())
}

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "hunter22".to_string(),
        username: "shopper".to_string(),
        phone: "5551234567".to_string(),
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn server() -> TestServer {
    let app = test_app(Arc::new(RecordingMediaStore::new()));
    TestServer::new(app.router()).unwrap()
}

#[tokio::test]
async fn test_register_then_login_yields_verifiable_token() {
    let auth = auth_service();

    let registered = auth.register(registration("ada@example.com"), Role::User).await.unwrap();
    assert_eq!(registered.user.role, Role::User);
    assert_ne!(registered.user.password_hash, "hunter22");

    let session = auth.login(login("ADA@example.com", "hunter22")).await.unwrap();
    let identity = auth.verify_token(&session.token).unwrap();

    assert_eq!(identity.user_id, registered.user.id);
    assert_eq!(identity.email, "ada@example.com");
    assert!(!identity.is_admin());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_alike() {
    let auth = auth_service();
    auth.register(registration("ada@example.com"), Role::User).await.unwrap();

    let wrong = auth.login(login("ada@example.com", "nope-nope")).await.unwrap_err();
    let unknown = auth.login(login("bob@example.com", "hunter22")).await.unwrap_err();

    for err in [wrong, unknown] {
        match err {
            CatalogError::Authentication { message } => assert_eq!(message, "Invalid credentials"),
            other => panic!("expected authentication error, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let auth = auth_service();
    auth.register(registration("ada@example.com"), Role::User).await.unwrap();

    let err = auth
        .register(registration("Ada@Example.com"), Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Conflict { .. }));
}

#[tokio::test]
async fn test_admin_login_rejects_regular_user() {
    let auth = auth_service();
    auth.register(registration("ada@example.com"), Role::User).await.unwrap();
    auth.register(registration("root@example.com"), Role::Admin).await.unwrap();

    let err = auth
        .login_admin(login("ada@example.com", "hunter22"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Authentication { .. }));

    let admin = auth.login_admin(login("root@example.com", "hunter22")).await.unwrap();
    assert!(auth.verify_token(&admin.token).unwrap().is_admin());
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let auth = auth_service();
    let session = auth.register(registration("ada@example.com"), Role::User).await.unwrap();

    let mut token = session.token.clone();
    token.push('x');
    assert!(matches!(
        auth.verify_token(&token),
        Err(CatalogError::Authentication { .. })
    ));

    let other = AuthServiceImpl::new(
        Arc::new(InMemoryUserRepository::new()),
        catalog_server::services::AuthSettings {
            jwt_secret: "another-secret".to_string(),
            ..test_auth_settings()
        },
    );
    assert!(other.verify_token(&session.token).is_err());
}

#[tokio::test]
async fn test_oversized_token_lifetime_is_an_error() {
    let auth = AuthServiceImpl::new(
        Arc::new(InMemoryUserRepository::new()),
        catalog_server::services::AuthSettings {
            token_ttl: chrono::Duration::try_days(999_999_999).unwrap(),
            ..test_auth_settings()
        },
    );

    let err = auth
        .register(registration("ada@example.com"), Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Internal { .. }));
}

#[tokio::test]
async fn test_list_users_by_role() {
    let auth = auth_service();
    auth.register(registration("ada@example.com"), Role::User).await.unwrap();
    auth.register(registration("root@example.com"), Role::Admin).await.unwrap();

    assert_eq!(auth.list_users(None).await.unwrap().len(), 2);
    let admins = auth.list_users(Some(Role::Admin)).await.unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].email, "root@example.com");
}

#[tokio::test]
async fn test_register_and_profile_over_http() {
    let server = server();

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "ada@example.com",
            "password": "hunter22",
            "username": "ada",
            "phone": "5551234567"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["role"], "USER");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let profile = server
        .get("/api/v1/auth/profile")
        .authorization_bearer(&token)
        .await;
    profile.assert_status_ok();
    let body: Value = profile.json();
    assert_eq!(body["data"]["email"], "ada@example.com");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = server();

    for path in ["/api/v1/auth/profile", "/api/v1/auth/users"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Access token is required");
    }

    let response = server
        .get("/api/v1/auth/profile")
        .authorization_bearer("not-a-token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_registration_lists_fields() {
    let server = server();

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({ "email": "nope", "password": "123" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    let detail = body["error"].as_str().unwrap();
    assert!(detail.contains("Password must be at least 6 characters long"));
}

#[tokio::test]
async fn test_first_admin_bootstraps_then_registration_is_gated() {
    let server = server();
    let admin = json!({
        "email": "root@example.com",
        "password": "hunter22",
        "username": "root",
        "phone": "5551234567"
    });

    let first = server.post("/api/v1/auth/admin/register").json(&admin).await;
    first.assert_status(StatusCode::CREATED);
    let admin_token = first.json::<Value>()["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let second = json!({
        "email": "ops@example.com",
        "password": "hunter22",
        "username": "ops",
        "phone": "5551234567"
    });
    server
        .post("/api/v1/auth/admin/register")
        .json(&second)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/api/v1/auth/admin/register")
        .authorization_bearer(&admin_token)
        .json(&second)
        .await
        .assert_status(StatusCode::CREATED);

    let users = server
        .get("/api/v1/auth/users")
        .authorization_bearer(&admin_token)
        .add_query_param("role", "admin")
        .await;
    users.assert_status_ok();
    assert_eq!(users.json::<Value>()["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_user_listing_is_admin_only() {
    let server = server();

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": "ada@example.com",
            "password": "hunter22",
            "username": "ada",
            "phone": "5551234567"
        }))
        .await;
    let token = response.json::<Value>()["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    server
        .get("/api/v1/auth/users")
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/api/v1/auth/admin/login")
        .json(&json!({ "email": "ada@example.com", "password": "hunter22" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}
