//! Authentication module for managing the signed-in session.
//!
//! This module provides:
//! - `SessionStore`: Shared, watchable session state persisted to secure storage
//! - `SecureStorage`: Key-value secret storage, backed by the OS keychain
//!   (`KeyringStorage`) or process memory (`MemoryStorage`)
//!
//! The token is stored as a plain string under `auth_token`; the user
//! profile is stored as JSON under `auth_user`.

pub mod storage;
pub mod store;

pub use storage::{KeyringStorage, MemoryStorage, SecureStorage, StorageError};
pub use store::{SessionStore, TOKEN_KEY, USER_KEY};
