//! Authentication-related DTOs.

use super::ProfileResponse;
use agora_core::validation::rules::{not_blank, password_strength, valid_username};
use agora_core::{AccountStatus, UserId, UserRole};
use agora_security::AuthTokens;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "password_strength", message = "Password must be at least 8 characters and contain a letter and a digit"))]
    pub password: String,

    #[validate(custom(function = "valid_username", message = "Username must be 3-30 letters, digits, '_' or '.', starting with a letter"))]
    pub username: String,

    #[validate(length(min = 1, max = 50, message = "Display name must be 1-50 characters"))]
    #[validate(custom(function = "not_blank", message = "Display name cannot be blank"))]
    pub display_name: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Password reset request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Password reset confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(custom(function = "password_strength", message = "Password must be at least 8 characters and contain a letter and a digit"))]
    pub new_password: String,
}

/// Email verification confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Authentication response.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: ProfileResponse,
    /// Status the account was restored from during this login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored: Option<AccountStatus>,
}

/// The signed-in account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub uid: UserId,
    pub email: String,
    pub email_verified: bool,
    pub role: UserRole,
    pub profile: Option<ProfileResponse>,
}

/// Generic message response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Creates a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::ValidateExt;

    fn register(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
            username: username.to_string(),
            display_name: "Ada".to_string(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register("ada_l", "analytical1").validate_request().is_ok());
        assert!(register("1ada", "analytical1").validate_request().is_err());
        assert!(register("ada", "short1").validate_request().is_err());
        assert!(register("ada", "nodigitshere").validate_request().is_err());
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = register("a", "analytical1").validate_request().unwrap_err();
        assert!(err.to_string().contains("username"));
    }
}
