use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::user::is_valid_email;

/// Problems with login form input, detected before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Email and password required")]
    Missing,

    #[error("Enter a valid email address")]
    InvalidEmail,
}

/// Email and password for one login attempt.
///
/// Held only in form-local state and never persisted. `Debug` output
/// redacts the password.
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Check the credentials are worth sending to the server.
    pub fn validate(&self) -> Result<(), CredentialsError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(CredentialsError::Missing);
        }
        if !is_valid_email(&self.email) {
            return Err(CredentialsError::InvalidEmail);
        }
        Ok(())
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ok() {
        assert_eq!(LoginCredentials::new("a@b.com", "x").validate(), Ok(()));
    }

    #[test]
    fn test_validate_missing_fields() {
        assert_eq!(
            LoginCredentials::new("", "x").validate(),
            Err(CredentialsError::Missing)
        );
        assert_eq!(
            LoginCredentials::new("a@b.com", "").validate(),
            Err(CredentialsError::Missing)
        );
    }

    #[test]
    fn test_validate_bad_email() {
        assert_eq!(
            LoginCredentials::new("not-an-email", "x").validate(),
            Err(CredentialsError::InvalidEmail)
        );
    }

    #[test]
    fn test_email_is_trimmed() {
        let creds = LoginCredentials::new("  a@b.com ", "x");
        assert_eq!(creds.email, "a@b.com");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = LoginCredentials::new("a@b.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_serializes_request_body() {
        let creds = LoginCredentials::new("a@b.com", "x");
        let body = serde_json::to_value(&creds).unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.com", "password": "x"}));
    }
}
