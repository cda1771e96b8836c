//! Input validation for command payloads

use thiserror::Error;

/// First problem found in a command input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Trait for checking a command input before it leaves the process
pub trait Validate {
    /// Returns Ok(()) if valid, or the first problem found
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Common validation helpers
pub mod validators {
    use super::ValidationError;

    /// Validate that a string is not blank
    pub fn validate_not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError(format!("{field} is required")));
        }
        Ok(())
    }

    /// Validate email format (basic check)
    pub fn validate_email(email: &str, field: &str) -> Result<(), ValidationError> {
        let mut parts = email.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !valid {
            return Err(ValidationError(format!("{field} is not a valid email address")));
        }
        Ok(())
    }

    /// Validate that a positive identifier was supplied
    pub fn validate_id(id: i64, field: &str) -> Result<(), ValidationError> {
        if id <= 0 {
            return Err(ValidationError(format!("{field} must be a positive number")));
        }
        Ok(())
    }

    /// Validate URL format
    pub fn validate_url(url: &str, field: &str) -> Result<(), ValidationError> {
        url::Url::parse(url)
            .map_err(|e| ValidationError(format!("{field}: invalid URL - {e}")))?;
        Ok(())
    }
}
