//! API client for the Sprout backend.
//!
//! This module provides the `ApiClient` struct, which performs the login
//! request and hands the raw body to `schema` for validation.

use std::time::Duration;

use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::LoginCredentials;

use super::schema::{self, LoginResponse};
use super::ApiError;

/// Path of the login endpoint, relative to the base URL.
const LOGIN_PATH: &str = "/auth/login";

/// API client for the Sprout backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for a token and user profile.
    ///
    /// Sends `POST /auth/login` with a JSON body and validates the response
    /// shape. Sends exactly one request; retrying is the caller's decision.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, ApiError> {
        let url = self.url(LOGIN_PATH);
        debug!(url = %url, email = %credentials.email, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let body = response.text().await?;

        schema::parse_login_response(&body).map_err(|e| {
            warn!(error = %e, "Login response failed validation");
            ApiError::from(e)
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Login request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::{ErrorKind, ValidationError};
    use crate::models::UserId;

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn ok_body() -> serde_json::Value {
        json!({"token": "abc", "user": {"id": 1, "name": "A", "email": "a@b.com"}})
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url(LOGIN_PATH), "http://localhost:3000/auth/login");
    }

    #[test]
    fn test_from_config_uses_defaults() {
        let client = ApiClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.base_url(), crate::config::DEFAULT_API_URL);
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header_matcher("content-type", "application/json"))
            .and(body_json(json!({"email": "a@b.com", "password": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .login(&LoginCredentials::new("a@b.com", "x"))
            .await
            .unwrap();

        assert_eq!(response.token, "abc");
        assert_eq!(response.user.id, UserId::from(1));
        assert_eq!(response.user.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_login_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&LoginCredentials::new("a@b.com", "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_login_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database on fire"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&LoginCredentials::new("a@b.com", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ServerError(ref body) if body == "database on fire"));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_login_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": 1, "name": "A", "email": "a@b.com"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .login(&LoginCredentials::new("a@b.com", "x"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, ApiError::Validation(ValidationError::Shape(_))));
    }

    #[tokio::test]
    async fn test_login_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), Duration::from_millis(100)).unwrap();
        let err = client
            .login(&LoginCredentials::new("a@b.com", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NetworkError(ref e) if e.is_timeout()));
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), "Connection timed out. Please try again.");
    }
}
