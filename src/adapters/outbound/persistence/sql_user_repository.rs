use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::db_error::map_db_error;
use crate::{
    domain::{
        errors::{CatalogError, CatalogResult},
        models::{NewUser, Role, User},
        value_objects::Email,
    },
    ports::repositories::UserRepository,
};

const USER_COLUMNS: &str = "id, email, password_hash, username, phone, role, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct SqlUserRepository {
    pool: PgPool,
}

impl SqlUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the accounts table
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                username TEXT NOT NULL,
                phone TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'USER' CHECK (role IN ('USER', 'ADMIN')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn user_from_row(row: &PgRow) -> CatalogResult<User> {
        let decode = |e: sqlx::Error| map_db_error(e, "User");
        let role: String = row.try_get("role").map_err(decode)?;

        Ok(User {
            id: row.try_get("id").map_err(decode)?,
            email: row.try_get("email").map_err(decode)?,
            password_hash: row.try_get("password_hash").map_err(decode)?,
            username: row.try_get("username").map_err(decode)?,
            phone: row.try_get("phone").map_err(decode)?,
            role: Role::parse(&role)
                .ok_or_else(|| CatalogError::internal(format!("Unknown role '{}'", role)))?,
            created_at: row.try_get("created_at").map_err(decode)?,
            updated_at: row.try_get("updated_at").map_err(decode)?,
        })
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn create(&self, user: NewUser) -> CatalogResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, email, password_hash, username, phone, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.username)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "User with this email"))?;

        Self::user_from_row(&row)
    }

    async fn find_by_email(&self, email: &Email) -> CatalogResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "User"))?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> CatalogResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "User"))?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn list(&self, role: Option<Role>) -> CatalogResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE ($1::TEXT IS NULL OR role = $1) ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "User"))?;

        rows.iter().map(Self::user_from_row).collect()
    }
}
