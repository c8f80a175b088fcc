use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    errors::{FieldError, FieldErrors, Validate},
    value_objects::Email,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored account
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub username: String,
    pub phone: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An account ready for insertion
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub username: String,
    pub phone: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub phone: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::new();

        if self.email.trim().is_empty() {
            errors.push(FieldError::required("email"));
        } else if let Err(e) = Email::parse(&self.email) {
            errors.push(e);
        }

        if self.password.is_empty() {
            errors.push(FieldError::required("password"));
        } else if self.password.chars().count() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters long",
            ));
        }

        errors.require("username", &self.username);

        if self.phone.trim().is_empty() {
            errors.push(FieldError::required("phone"));
        } else {
            errors.check_len("phone", self.phone.trim(), 10, 12);
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = FieldErrors::new();

        if self.email.trim().is_empty() {
            errors.push(FieldError::required("email"));
        } else if let Err(e) = Email::parse(&self.email) {
            errors.push(e);
        }

        if self.password.is_empty() {
            errors.push(FieldError::required("password"));
        }

        errors.into_result()
    }
}

/// Identity attached to a request by a verified bearer token
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A signed-in account and its token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}
