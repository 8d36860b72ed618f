//! Core library for Sprout.
//!
//! This crate holds everything that is not terminal rendering:
//!
//! - `config`: Application configuration (API base URL, timeouts)
//! - `models`: `User`, `Session`, and `LoginCredentials`
//! - `api`: Remote login accessor and response-shape validation
//! - `auth`: Session store with secure-storage persistence
//! - `mutation`: Status tracking and retry policy for write-style requests
//! - `login`: The login mutation coordinator tying the pieces together

pub mod api;
pub mod auth;
pub mod config;
pub mod login;
pub mod models;
pub mod mutation;

pub use api::{ApiClient, ApiError};
pub use auth::{KeyringStorage, MemoryStorage, SecureStorage, SessionStore};
pub use config::Config;
pub use login::{LoginCoordinator, LoginError, LoginStatus};
pub use models::{AuthSession, LoginCredentials, Session, User, UserId};
