//! Name validation shared by users and categories

use super::ValidationError;

/// Maximum length for names, titles and category labels
pub const MAX_TEXT_LEN: usize = 255;

const NAME_FIELD: &str = "Name";

/// Trim `s` and check it is non-empty and within `MAX_TEXT_LEN` characters.
pub(crate) fn bounded_text(field: &'static str, s: &str) -> Result<String, ValidationError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        });
    }

    Ok(trimmed.to_owned())
}

/// Validated user or category name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    /// Create a new name.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace); blank reads as "Name is required"
    /// - Max 255 characters
    ///
    /// # Example
    /// ```
    /// use spendctl_server::models::Name;
    ///
    /// assert!(Name::new("Ada").is_ok());
    /// assert!(Name::new("").is_err());
    /// assert!(Name::new("   ").is_err());  // whitespace only
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text(NAME_FIELD, s).map(Self).map_err(|e| match e {
            ValidationError::Empty { field } => ValidationError::Missing { field },
            other => other,
        })
    }

    /// Validate an optional request field, treating absence as missing.
    pub fn required(s: Option<&str>) -> Result<Self, ValidationError> {
        match s {
            Some(s) => Self::new(s),
            None => Err(ValidationError::Missing { field: NAME_FIELD }),
        }
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
