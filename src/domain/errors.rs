use std::fmt;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// A single rejected input field together with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Resource not found")]
    NotFound,
    #[error("Invalid input: {}", join_fields(.0))]
    InvalidInput(Vec<FieldError>),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::InvalidInput(vec![FieldError::new(field, message)])
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_lists_every_field() {
        let err = DomainError::InvalidInput(vec![
            FieldError::new("items[0].quantity", "must be a positive integer"),
            FieldError::new("total", "must be a decimal number"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid input: items[0].quantity: must be a positive integer; total: must be a decimal number"
        );
    }

    #[test]
    fn invalid_shorthand_builds_single_field() {
        let DomainError::InvalidInput(fields) = DomainError::invalid("city", "must not be blank")
        else {
            panic!("expected InvalidInput");
        };
        assert_eq!(fields, vec![FieldError::new("city", "must not be blank")]);
    }
}
