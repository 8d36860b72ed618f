//! Data models for Sprout.
//!
//! - `User`, `UserId`: The signed-in user's profile
//! - `Session`, `AuthSession`: Logged-out or authenticated state
//! - `LoginCredentials`: Transient form input for one login attempt

pub mod credentials;
pub mod session;
pub mod user;

pub use credentials::{CredentialsError, LoginCredentials};
pub use session::{AuthSession, Session};
pub use user::{is_valid_email, User, UserId};
