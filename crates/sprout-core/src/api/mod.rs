//! REST API client module for the Sprout backend.
//!
//! This module provides the `ApiClient` for the single login endpoint and
//! the pure `schema` functions that validate its response shape. Keeping
//! validation independent of HTTP lets it be tested against literal payloads.

pub mod client;
pub mod error;
pub mod schema;

pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};
pub use schema::{parse_login_response, LoginResponse, ValidationError};
