use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::CatalogResult,
    models::{AuthSession, AuthenticatedUser, LoginRequest, RegisterRequest, Role, User},
};

/// Port for account registration, sign-in and token verification
#[async_trait]
pub trait AuthService: Send + Sync + 'static {
    /// Register an account with the given role and sign it in
    async fn register(&self, request: RegisterRequest, role: Role) -> CatalogResult<AuthSession>;

    /// Sign in any account
    async fn login(&self, request: LoginRequest) -> CatalogResult<AuthSession>;

    /// Sign in an account that must hold the admin role
    async fn login_admin(&self, request: LoginRequest) -> CatalogResult<AuthSession>;

    /// Check a bearer token and return the identity it carries
    fn verify_token(&self, token: &str) -> CatalogResult<AuthenticatedUser>;

    async fn profile(&self, user_id: Uuid) -> CatalogResult<User>;

    async fn list_users(&self, role: Option<Role>) -> CatalogResult<Vec<User>>;
}
