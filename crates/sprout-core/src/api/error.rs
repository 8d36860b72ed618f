use thiserror::Error;

use super::schema::ValidationError;

/// Broad classification of an API failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response, or a non-2xx response.
    Transport,
    /// A 2xx response whose body did not match the expected shape.
    Validation,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - invalid email or password")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Malformed response: {0}")]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Transport,
        }
    }

    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::ServerError(_) | ApiError::RateLimited => true,
            _ => false,
        }
    }

    /// Short message suitable for showing inline in the login form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Invalid email or password".to_string(),
            ApiError::NetworkError(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::NetworkError(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::RateLimited => "Too many attempts. Please wait and try again.".to_string(),
            ApiError::Validation(_) => "Unexpected response from server".to_string(),
            _ => format!("Login failed: {}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "nope"),
            ApiError::AccessDenied(body) if body == "nope"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, ""),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ApiError::ServerError(body) if body == "boom"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "bad"),
            ApiError::InvalidResponse(msg) if msg.contains("400") && msg.contains("bad")
        ));
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 100);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated, 600 total bytes"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // 'é' is two bytes, so byte 500 falls in the middle of a character
        let body = format!("a{}", "é".repeat(300));
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_kind_and_retryable() {
        let validation = ApiError::Validation(ValidationError::Shape("missing field `token`".into()));
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert!(!validation.is_retryable());

        let server = ApiError::ServerError("boom".into());
        assert_eq!(server.kind(), ErrorKind::Transport);
        assert!(server.is_retryable());

        assert!(!ApiError::Unauthorized.is_retryable());
        assert_eq!(ApiError::Unauthorized.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(ApiError::Unauthorized.user_message(), "Invalid email or password");
        assert_eq!(
            ApiError::Validation(ValidationError::Shape("x".into())).user_message(),
            "Unexpected response from server"
        );
        assert!(ApiError::ServerError("boom".into())
            .user_message()
            .starts_with("Login failed"));
    }
}
