use thiserror::Error as ThisError;

use super::FieldError;

/// Errors raised by the catalog and identity services.
///
/// Every variant carries a client-facing message; the HTTP shell decides the
/// status code and whether the message is shown verbatim.
#[derive(ThisError, Debug, Clone)]
pub enum CatalogError {
    /// Missing or malformed input
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// A unique field already holds this value
    #[error("{message}")]
    Conflict { message: String },

    #[error("{message}")]
    NotFound { message: String },

    /// Bad, missing or expired credentials
    #[error("{message}")]
    Authentication { message: String },

    /// Authenticated, but not allowed
    #[error("{message}")]
    Forbidden { message: String },

    /// The media host rejected or failed an operation
    #[error("Media store error: {message}")]
    Media { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        CatalogError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn invalid_fields(fields: Vec<FieldError>) -> Self {
        CatalogError::Validation {
            message: "Validation failed".to_string(),
            fields,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CatalogError::Conflict {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        CatalogError::Authentication {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CatalogError::Forbidden {
            message: message.into(),
        }
    }

    pub fn media(message: impl Into<String>) -> Self {
        CatalogError::Media {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CatalogError::Internal {
            message: message.into(),
        }
    }

    /// Errors that are not the client's fault
    pub fn is_internal(&self) -> bool {
        matches!(self, CatalogError::Media { .. } | CatalogError::Internal { .. })
    }
}

impl From<Vec<FieldError>> for CatalogError {
    fn from(fields: Vec<FieldError>) -> Self {
        CatalogError::invalid_fields(fields)
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
