//! JSON extractor that runs `validator` rules before the handler.

use crate::responses::error_response;
use agora_core::{ErrorResponse, FieldError};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Deserialized and validated JSON body.
///
/// Malformed JSON and failed rules both answer 400 in the standard envelope,
/// the latter with one [`FieldError`] per broken rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection type for validated JSON extraction.
pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Invalid(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let body = match self {
            Self::Json(rejection) => ErrorResponse {
                code: "INVALID_JSON".to_string(),
                message: rejection.body_text(),
                details: None,
            },
            Self::Invalid(errors) => ErrorResponse {
                code: "VALIDATION_ERROR".to_string(),
                message: "Request validation failed".to_string(),
                details: Some(field_errors(&errors)),
            },
        };
        error_response(StatusCode::BAD_REQUEST, body)
    }
}

/// Flattens validator errors, prefixing nested fields with their path.
fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(list) => {
                for err in list {
                    out.push(FieldError {
                        field: field.to_string(),
                        message: err
                            .message
                            .as_ref()
                            .map_or_else(|| format!("Invalid value for '{field}'"), ToString::to_string),
                        code: err.code.to_string(),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                for err in field_errors(nested) {
                    out.push(FieldError {
                        field: format!("{field}.{}", err.field),
                        ..err
                    });
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    for err in field_errors(nested) {
                        out.push(FieldError {
                            field: format!("{field}[{index}].{}", err.field),
                            ..err
                        });
                    }
                }
            }
        }
    }

    out
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;

        value.validate().map_err(ValidatedJsonRejection::Invalid)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_service::{RegisterRequest, UpdateProfileRequest};

    #[test]
    fn test_register_errors_name_each_field() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            username: "ok_name".to_string(),
            display_name: "Ada".to_string(),
        };

        let errors = field_errors(&request.validate().unwrap_err());
        let mut fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        fields.sort_unstable();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn test_custom_message_is_kept() {
        let request = UpdateProfileRequest {
            bio: Some("x".repeat(161)),
            ..Default::default()
        };

        let errors = field_errors(&request.validate().unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "bio");
        assert!(!errors[0].message.is_empty());
    }
}
