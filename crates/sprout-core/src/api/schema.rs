//! Shape validation for login responses.
//!
//! Everything here is a pure function over the response body, with no
//! HTTP types involved.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{is_valid_email, User};

/// A login response body that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The body was not JSON, or a field was missing or had the wrong type.
    #[error("{0}")]
    Shape(String),

    #[error("user.email is not a valid email address: {0}")]
    InvalidEmail(String),
}

/// Validated body of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Parse and validate a raw login response body.
///
/// Expected shape: `{ token: string, user: { id: number | string,
/// name: string, email: <valid address> } }`. Unknown fields are ignored.
pub fn parse_login_response(body: &str) -> Result<LoginResponse, ValidationError> {
    let response: LoginResponse =
        serde_json::from_str(body).map_err(|e| ValidationError::Shape(e.to_string()))?;
    check_login_response(response)
}

/// Validate an already-parsed JSON value.
pub fn validate_login_response(value: serde_json::Value) -> Result<LoginResponse, ValidationError> {
    let response: LoginResponse =
        serde_json::from_value(value).map_err(|e| ValidationError::Shape(e.to_string()))?;
    check_login_response(response)
}

fn check_login_response(response: LoginResponse) -> Result<LoginResponse, ValidationError> {
    if !is_valid_email(&response.user.email) {
        return Err(ValidationError::InvalidEmail(response.user.email));
    }
    Ok(response)
}
