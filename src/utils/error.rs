use actix_web::{http::StatusCode, HttpResponse};
use std::fmt;

use crate::utils::response::error_object;
use crate::utils::validation::FieldError;

/// Flat error taxonomy for the service. Everything unexpected (database,
/// provider, SMTP) collapses into `Internal` at the handler boundary.
#[derive(Debug)]
pub enum ApiError {
    ValidationFailed(Vec<FieldError>),
    EmailAlreadyExists,
    InvalidEmailPassword,
    InvalidVerificationCode,
    NoPermission,
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ValidationFailed(_) => "VALIDATION_FAILED",
            ApiError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            ApiError::InvalidEmailPassword => "INVALID_EMAIL_PASSWORD",
            ApiError::InvalidVerificationCode => "INVALID_VERIFICATION_CODE",
            ApiError::NoPermission => "NO_PERMISSION",
            ApiError::Internal(_) => "SOMETHING_BAD_HAPPENED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::EmailAlreadyExists => StatusCode::CONFLICT,
            ApiError::InvalidEmailPassword
            | ApiError::InvalidVerificationCode
            | ApiError::NoPermission => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn errors(&self) -> serde_json::Value {
        match self {
            ApiError::ValidationFailed(fields) => serde_json::json!(fields),
            ApiError::Internal(detail) => serde_json::json!([detail]),
            _ => serde_json::json!([]),
        }
    }

    /// Renders the `{code, message, errors}` envelope with the mapped status.
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::build(self.status()).json(error_object(
            self.code(),
            &self.to_string(),
            self.errors(),
        ))
    }

    pub fn database(err: mongodb::error::Error) -> Self {
        ApiError::Internal(format!("Database error: {}", err))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::ValidationFailed(_) => write!(f, "Validation Failed"),
            ApiError::EmailAlreadyExists => {
                write!(f, "Account with that email address already exists")
            }
            ApiError::InvalidEmailPassword => write!(f, "Invalid email or password"),
            ApiError::InvalidVerificationCode => {
                write!(f, "Invalid or expired verification code")
            }
            ApiError::NoPermission => write!(f, "No permission"),
            ApiError::Internal(_) => write!(f, "Something bad happened"),
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::ValidationFailed(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::EmailAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InvalidEmailPassword.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_keeps_raw_detail() {
        let err = ApiError::Internal("connection refused".into());
        assert_eq!(err.errors(), serde_json::json!(["connection refused"]));
    }
}
