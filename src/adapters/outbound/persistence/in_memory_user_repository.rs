use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{CatalogError, CatalogResult},
        models::{NewUser, Role, User},
        value_objects::Email,
    },
    ports::repositories::UserRepository,
};

/// In-memory implementation of UserRepository for testing and development
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> CatalogResult<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == user.email.as_str()) {
            return Err(CatalogError::conflict("User with this email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: user.email.as_str().to_string(),
            password_hash: user.password_hash,
            username: user.username,
            phone: user.phone,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> CatalogResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email.as_str()).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self, role: Option<Role>) -> CatalogResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect())
    }
}
