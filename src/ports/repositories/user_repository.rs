use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    errors::CatalogResult,
    models::{NewUser, Role, User},
    value_objects::Email,
};

/// Persistence for accounts
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Fails with `Conflict` when the email is registered
    async fn create(&self, user: NewUser) -> CatalogResult<User>;

    async fn find_by_email(&self, email: &Email) -> CatalogResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<User>>;

    /// Accounts, oldest first, optionally restricted to one role
    async fn list(&self, role: Option<Role>) -> CatalogResult<Vec<User>>;
}
