use crate::domain::errors::FieldError;

const MAX_COLOR_NAME_LEN: usize = 64;

/// A color name as submitted with a product.
///
/// Admin forms send colors either as a bare name or as an `"<id>,<name>"`
/// pair; only the name part identifies the color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorName(String);

impl ColorName {
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let name = match raw.split_once(',') {
            Some((_, name)) => name.trim(),
            None => raw.trim(),
        };

        if name.is_empty() {
            return Err(FieldError::new("colors", "Color name cannot be empty"));
        }

        if name.chars().count() > MAX_COLOR_NAME_LEN {
            return Err(FieldError::new(
                "colors",
                format!("Color name too long (max: {})", MAX_COLOR_NAME_LEN),
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Parse a list, dropping repeats while keeping first-seen order
    pub fn parse_all<'a, I>(raw: I) -> Result<Vec<ColorName>, FieldError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<ColorName> = Vec::new();
        for value in raw {
            let name = ColorName::parse(value)?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ColorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
