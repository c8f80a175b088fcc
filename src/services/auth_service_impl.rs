use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        errors::{CatalogError, CatalogResult, Validate},
        models::{
            AuthSession, AuthenticatedUser, LoginRequest, NewUser, RegisterRequest, Role, User,
        },
        value_objects::Email,
    },
    ports::{repositories::UserRepository, services::AuthService},
};

/// Token and password hashing settings
#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

/// Implementation of AuthService using bcrypt hashes and HS256 tokens
#[derive(Clone)]
pub struct AuthServiceImpl {
    users: Arc<dyn UserRepository>,
    settings: AuthSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthServiceImpl {
    pub fn new(users: Arc<dyn UserRepository>, settings: AuthSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(settings.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(settings.jwt_secret.as_bytes());
        Self {
            users,
            settings,
            encoding_key,
            decoding_key,
        }
    }

    fn issue_token(&self, user: &User) -> CatalogResult<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.settings.token_ttl)
            .ok_or_else(|| CatalogError::internal("Token lifetime is out of range"))?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| CatalogError::internal(format!("Token creation failed: {}", e)))
    }

    async fn hash_password(&self, password: String) -> CatalogResult<String> {
        let cost = self.settings.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| CatalogError::internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| CatalogError::internal(format!("Password hashing failed: {}", e)))
    }

    async fn verify_password(&self, password: String, hash: String) -> CatalogResult<bool> {
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| CatalogError::internal(format!("Password check task failed: {}", e)))?
            .map_err(|e| CatalogError::internal(format!("Password check failed: {}", e)))
    }

    /// Look up an account and check its password.
    ///
    /// Unknown emails and wrong passwords fail the same way.
    async fn authenticate(&self, request: LoginRequest) -> CatalogResult<User> {
        request.validate()?;
        let email = Email::parse(&request.email).map_err(|e| CatalogError::from(vec![e]))?;

        let invalid = || CatalogError::authentication("Invalid credentials");
        let user = self.users.find_by_email(&email).await?.ok_or_else(invalid)?;

        if !self
            .verify_password(request.password, user.password_hash.clone())
            .await?
        {
            return Err(invalid());
        }

        Ok(user)
    }

    fn session(&self, user: User) -> CatalogResult<AuthSession> {
        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: RegisterRequest, role: Role) -> CatalogResult<AuthSession> {
        request.validate()?;
        let email = Email::parse(&request.email).map_err(|e| CatalogError::from(vec![e]))?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CatalogError::conflict("User with this email already exists"));
        }

        let password_hash = self.hash_password(request.password).await?;
        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                username: request.username.trim().to_string(),
                phone: request.phone.trim().to_string(),
                role,
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered account");
        self.session(user)
    }

    async fn login(&self, request: LoginRequest) -> CatalogResult<AuthSession> {
        let user = self.authenticate(request).await?;
        tracing::debug!(user_id = %user.id, "Signed in");
        self.session(user)
    }

    async fn login_admin(&self, request: LoginRequest) -> CatalogResult<AuthSession> {
        let user = self.authenticate(request).await?;
        if user.role != Role::Admin {
            return Err(CatalogError::authentication("Not authorized as admin"));
        }
        tracing::debug!(user_id = %user.id, "Admin signed in");
        self.session(user)
    }

    fn verify_token(&self, token: &str) -> CatalogResult<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| CatalogError::authentication("Invalid or expired token"))?;

        let claims = data.claims;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| CatalogError::authentication("Invalid or expired token"))?;
        let role = Role::parse(&claims.role)
            .ok_or_else(|| CatalogError::authentication("Invalid or expired token"))?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            role,
        })
    }

    async fn profile(&self, user_id: Uuid) -> CatalogResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("User not found"))
    }

    async fn list_users(&self, role: Option<Role>) -> CatalogResult<Vec<User>> {
        self.users.list(role).await
    }
}
