//! Validation error types

use std::fmt;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required field was not supplied (or supplied as null)
    Missing { field: &'static str },

    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Value doesn't match the expected format (e.g., timestamp, id)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Partial update carried none of the updatable fields
    NoUpdatableFields,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::NoUpdatableFields => write!(f, "No valid fields to update"),
        }
    }
}

impl std::error::Error for ValidationError {}
