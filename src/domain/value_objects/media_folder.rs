use crate::domain::errors::FieldError;

/// A validated folder (key prefix) on the media host
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaFolder(String);

impl MediaFolder {
    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        let invalid = |message: &str| FieldError::new("folder", message);

        if value.is_empty() {
            return Err(invalid("Media folder cannot be empty"));
        }

        if value.len() > 255 {
            return Err(invalid("Media folder too long (max: 255)"));
        }

        if value.starts_with('/') || value.ends_with('/') {
            return Err(invalid("Media folder cannot start or end with '/'"));
        }

        if value.contains("//") || value.contains("..") || value.contains('\0') {
            return Err(invalid("Media folder contains an invalid sequence"));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the object key for a file stored in this folder
    pub fn key_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.0, file_name)
    }
}

impl Default for MediaFolder {
    fn default() -> Self {
        Self("products".to_string())
    }
}

impl std::fmt::Display for MediaFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_folder() {
        let folder = MediaFolder::new("catalog/products").unwrap();
        assert_eq!(folder.key_for("a.png"), "catalog/products/a.png");
    }

    #[test]
    fn test_invalid_folder() {
        assert!(MediaFolder::new("").is_err());
        assert!(MediaFolder::new("/abs").is_err());
        assert!(MediaFolder::new("trailing/").is_err());
        assert!(MediaFolder::new("a//b").is_err());
        assert!(MediaFolder::new("../escape").is_err());
    }
}
