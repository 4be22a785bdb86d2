//! Validation utilities.

use crate::{AgoraError, FieldError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns an `AgoraError` on failure.
    fn validate_request(&self) -> Result<(), AgoraError> {
        self.validate().map_err(|e| validation_errors_to_agora_error(&e))
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn validation_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Converts `validator::ValidationErrors` to `AgoraError`.
#[must_use]
pub fn validation_errors_to_agora_error(errors: &ValidationErrors) -> AgoraError {
    let message = validation_field_errors(errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    AgoraError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Minimum username length.
    pub const USERNAME_MIN: usize = 3;
    /// Maximum username length.
    pub const USERNAME_MAX: usize = 30;
    /// Minimum password length.
    pub const PASSWORD_MIN: usize = 8;
    /// Maximum password length.
    pub const PASSWORD_MAX: usize = 128;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that a password is long enough and mixes letters and digits.
    pub fn password_strength(password: &str) -> Result<(), ValidationError> {
        let length = password.chars().count();
        if length < PASSWORD_MIN {
            return Err(ValidationError::new("password_too_short"));
        }
        if length > PASSWORD_MAX {
            return Err(ValidationError::new("password_too_long"));
        }
        if !password.chars().any(char::is_alphabetic) {
            return Err(ValidationError::new("password_missing_letter"));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("password_missing_digit"));
        }
        Ok(())
    }

    /// Validates that a username meets requirements.
    ///
    /// Usernames are 3 to 30 ASCII letters, digits, `_` or `.`, starting
    /// with a letter.
    pub fn valid_username(username: &str) -> Result<(), ValidationError> {
        if username.len() < USERNAME_MIN {
            return Err(ValidationError::new("username_too_short"));
        }
        if username.len() > USERNAME_MAX {
            return Err(ValidationError::new("username_too_long"));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(ValidationError::new("username_invalid_characters"));
        }
        if !username.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::new("username_must_start_with_letter"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Invalid email"))]
        email: String,
        #[validate(custom(function = "valid_username"))]
        username: String,
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(password_strength("abcd1234").is_ok());
        assert!(password_strength("short1").is_err());
        assert!(password_strength("onlyletters").is_err());
        assert!(password_strength("12345678").is_err());
    }

    #[test]
    fn test_valid_username() {
        assert!(valid_username("jane_doe").is_ok());
        assert!(valid_username("jane.doe2").is_ok());
        assert!(valid_username("jd").is_err());
        assert!(valid_username("1jane").is_err());
        assert!(valid_username("jane-doe").is_err());
        assert!(valid_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_request_collects_fields() {
        let signup = Signup {
            email: "not-an-email".to_string(),
            username: "x".to_string(),
        };
        let errors = signup.validate().unwrap_err();
        let fields = validation_field_errors(&errors);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].message, "Invalid email");
        assert_eq!(fields[1].code, "username_too_short");

        let err = signup.validate_request().unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
