use crate::domain::errors::FieldError;

/// A normalized (trimmed, lower-cased) email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let value = raw.trim().to_lowercase();
        let invalid = || FieldError::new("email", "Please provide a valid email address");

        let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') || value.contains(char::is_whitespace) {
            return Err(invalid());
        }

        match domain.rsplit_once('.') {
            Some((host, tld)) if !host.is_empty() && tld.len() >= 2 => Ok(Self(value)),
            _ => Err(invalid()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
