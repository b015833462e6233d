use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const MIN_PASSWORD_LENGTH: usize = 8;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
            .expect("invalid email regex");
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

pub type ValidationResult = Result<(), Vec<FieldError>>;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn finish(errors: Vec<FieldError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Signup: well-formed email plus a password of at least 8 characters.
pub fn validate_credentials(email: &str, password: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "email is not valid"));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            "password",
            "password must be at least 8 characters long",
        ));
    }
    finish(errors)
}

/// Login only requires a well-formed email and a non-blank password.
pub fn validate_login(email: &str, password: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "email is not valid"));
    }
    if password.is_empty() {
        errors.push(FieldError::new("password", "password cannot be blank"));
    }
    finish(errors)
}

pub fn validate_email(email: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "email is not valid"));
    }
    finish(errors)
}

pub fn validate_not_blank(field: &'static str, value: &str) -> ValidationResult {
    let mut errors = Vec::new();
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "field is missing"));
    }
    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.io"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_short_password_rejected() {
        let errors = validate_credentials("a@x.com", "short").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "password");
    }

    #[test]
    fn test_both_fields_reported() {
        let errors = validate_credentials("bad", "short").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_valid_credentials_pass() {
        assert!(validate_credentials("a@x.com", "password1").is_ok());
    }

    #[test]
    fn test_blank_field() {
        assert!(validate_not_blank("plaid_public_token", "  ").is_err());
        assert!(validate_not_blank("plaid_public_token", "public-sandbox-123").is_ok());
    }
}
