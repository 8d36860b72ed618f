use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::models::{AuthSession, Session, User};

use super::storage::{SecureStorage, StorageError};

/// Secure-storage key holding the bearer token as a plain string.
pub const TOKEN_KEY: &str = "auth_token";

/// Secure-storage key holding the user profile as JSON.
pub const USER_KEY: &str = "auth_user";

/// Profile record persisted next to the token.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    user: User,
    signed_in_at: DateTime<Utc>,
}

struct Inner {
    storage: Arc<dyn SecureStorage>,
    state: watch::Sender<Session>,
    /// Serializes storage writes so concurrent updates cannot interleave.
    write_lock: Arc<Mutex<()>>,
}

/// Single source of truth for the signed-in session.
///
/// Clones share the same state. Every change is written through to secure
/// storage and broadcast to `subscribe()` receivers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create an empty (logged-out) store without reading storage.
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self::with_session(storage, Session::LoggedOut)
    }

    /// Create a store from whatever secure storage holds.
    ///
    /// A session is restored only when both the token and the profile are
    /// present and readable. Anything partial is removed and the store
    /// starts logged out.
    pub fn restore(storage: Arc<dyn SecureStorage>) -> Self {
        let session = match Self::read_persisted(storage.as_ref()) {
            Ok(Some(auth)) => {
                info!(user_id = %auth.user.id, "Restored session from secure storage");
                Session::Authenticated(auth)
            }
            Ok(None) => {
                debug!("No persisted session");
                Session::LoggedOut
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted session");
                if let Err(e) = Self::remove_persisted(storage.as_ref()) {
                    error!(error = %e, "Failed to remove unreadable persisted session");
                }
                Session::LoggedOut
            }
        };
        Self::with_session(storage, session)
    }

    fn with_session(storage: Arc<dyn SecureStorage>, session: Session) -> Self {
        let (state, _) = watch::channel(session);
        Self {
            inner: Arc::new(Inner {
                storage,
                state,
                write_lock: Arc::new(Mutex::new(())),
            }),
        }
    }

    fn read_persisted(storage: &dyn SecureStorage) -> Result<Option<AuthSession>, StorageError> {
        let token = storage.get(TOKEN_KEY)?;
        let profile = storage.get(USER_KEY)?;

        match (token, profile) {
            (Some(token), Some(profile)) => {
                let profile: StoredProfile = serde_json::from_str(&profile)?;
                Ok(Some(AuthSession {
                    token,
                    user: profile.user,
                    signed_in_at: profile.signed_in_at,
                }))
            }
            (None, None) => Ok(None),
            _ => Err(StorageError::Backend(
                "token and profile must be stored together".to_string(),
            )),
        }
    }

    /// Best-effort removal of both keys. Returns the first failure.
    fn remove_persisted(storage: &dyn SecureStorage) -> Result<(), StorageError> {
        let token_result = storage.delete(TOKEN_KEY);
        let user_result = storage.delete(USER_KEY);
        token_result.and(user_result)
    }

    /// Run `op` on the blocking pool while holding the write lock.
    ///
    /// Keychain calls can block on IPC or an unlock prompt. The lock is
    /// released when `op` returns, even if the calling future is dropped
    /// first, so a later write never races an abandoned one.
    async fn write<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Inner) -> T + Send + 'static,
        T: Send + 'static,
    {
        let guard = Arc::clone(&self.inner.write_lock).lock_owned().await;
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            op(&inner)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("storage task failed: {}", e)))
    }

    /// Replace the session with `token` and `user`, then persist it.
    ///
    /// Always succeeds; persistence failures are logged and the in-memory
    /// session is still updated. Storage never keeps the new token next to
    /// a previous user's profile.
    pub async fn set_session(&self, token: String, user: User) {
        let auth = AuthSession::new(token, user);
        let profile = StoredProfile {
            user: auth.user.clone(),
            signed_in_at: auth.signed_in_at,
        };

        let result = self
            .write(move |inner| {
                let persisted = Self::persist(inner.storage.as_ref(), &auth.token, &profile);
                info!(user_id = %auth.user.id, "Session set");
                inner.state.send_replace(Session::Authenticated(auth));
                persisted
            })
            .await
            .and_then(|persisted| persisted);

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
    }

    /// Write the token and profile as a pair.
    ///
    /// The old profile goes first, so an interrupted write leaves at most a
    /// token without a profile, which `restore` discards. On failure both
    /// keys are removed.
    fn persist(
        storage: &dyn SecureStorage,
        token: &str,
        profile: &StoredProfile,
    ) -> Result<(), StorageError> {
        let result = serde_json::to_string(profile)
            .map_err(StorageError::from)
            .and_then(|profile| {
                storage.delete(USER_KEY)?;
                storage.set(TOKEN_KEY, token)?;
                storage.set(USER_KEY, &profile)
            });

        if result.is_err() {
            if let Err(e) = Self::remove_persisted(storage) {
                error!(error = %e, "Failed to remove partially written session");
            }
        }
        result
    }

    /// Delete the persisted session, then reset to logged out.
    ///
    /// The in-memory session is cleared even when deletion fails. The
    /// failure is returned so callers can warn that a stale token may
    /// remain in the keychain.
    pub async fn clear_session(&self) -> Result<(), StorageError> {
        let result = self
            .write(|inner| {
                let removed = Self::remove_persisted(inner.storage.as_ref());
                inner.state.send_replace(Session::LoggedOut);
                removed
            })
            .await;

        let result = match result {
            Ok(removed) => removed,
            Err(e) => {
                self.inner.state.send_replace(Session::LoggedOut);
                Err(e)
            }
        };

        if let Err(ref e) = result {
            error!(error = %e, "Failed to delete persisted session");
        }
        info!("Session cleared");
        result
    }

    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token().map(str::to_string)
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Watch for session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }
}
