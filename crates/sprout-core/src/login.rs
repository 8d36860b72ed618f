//! Login mutation coordinator.
//!
//! `LoginCoordinator` runs one login attempt at a time: it validates the
//! credentials, calls the API, and on success hands the token and user to
//! the `SessionStore`. Its status is watchable so the UI can show a pending
//! indicator and inline errors.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::api::{ApiClient, ApiError};
use crate::auth::SessionStore;
use crate::models::{CredentialsError, LoginCredentials, User};
use crate::mutation::{run_with_retry, MutationStatus, RetryPolicy};

pub type LoginStatus = MutationStatus<User>;

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("A login attempt is already in progress")]
    AlreadyPending,

    #[error(transparent)]
    InvalidCredentials(#[from] CredentialsError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Resets a pending status to idle if an attempt is dropped before it
/// finishes.
struct PendingGuard<'a> {
    status: &'a watch::Sender<LoginStatus>,
    armed: bool,
}

impl PendingGuard<'_> {
    fn finish(mut self, status: LoginStatus) {
        self.armed = false;
        self.status.send_replace(status);
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("Login attempt cancelled");
            self.status.send_if_modified(|status| {
                if status.is_pending() {
                    *status = MutationStatus::Idle;
                    true
                } else {
                    false
                }
            });
        }
    }
}

/// Orchestrates login attempts and connects their outcome to the session.
/// Clones share status, client, and session store.
#[derive(Clone)]
pub struct LoginCoordinator {
    api: ApiClient,
    store: SessionStore,
    retry: RetryPolicy,
    status: Arc<watch::Sender<LoginStatus>>,
}

impl LoginCoordinator {
    /// Create a coordinator that sends each login exactly once.
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        let (status, _) = watch::channel(LoginStatus::Idle);
        Self {
            api,
            store,
            retry: RetryPolicy::none(),
            status: Arc::new(status),
        }
    }

    /// Retry transport failures according to `policy`.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn status(&self) -> LoginStatus {
        self.status.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.status.borrow().is_pending()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginStatus> {
        self.status.subscribe()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Return to idle, e.g. when the login form is reopened. Ignored while
    /// an attempt is pending.
    pub fn reset(&self) {
        self.status.send_if_modified(|status| {
            if status.is_pending() || status.is_idle() {
                false
            } else {
                *status = MutationStatus::Idle;
                true
            }
        });
    }

    /// Run one login attempt.
    ///
    /// Rejected with `AlreadyPending` while another attempt is in flight.
    /// On success the session store holds the returned token and user; on
    /// failure the store is untouched and the status carries a displayable
    /// message.
    pub async fn submit(&self, credentials: LoginCredentials) -> Result<User, LoginError> {
        let claimed = self.status.send_if_modified(|status| {
            if status.is_pending() {
                false
            } else {
                *status = MutationStatus::Pending;
                true
            }
        });
        if !claimed {
            debug!("Ignoring login submit while another is pending");
            return Err(LoginError::AlreadyPending);
        }

        let guard = PendingGuard {
            status: self.status.as_ref(),
            armed: true,
        };

        if let Err(e) = credentials.validate() {
            guard.finish(MutationStatus::Error(e.to_string()));
            return Err(e.into());
        }

        info!(email = %credentials.email, "Login attempt started");

        let result = run_with_retry(
            self.retry,
            || self.api.login(&credentials),
            ApiError::is_retryable,
        )
        .await;

        match result {
            Ok(response) => {
                let user = response.user;
                self.store.set_session(response.token, user.clone()).await;
                info!(user_id = %user.id, "Login succeeded");
                guard.finish(MutationStatus::Success(user.clone()));
                Ok(user)
            }
            Err(e) => {
                error!(error = %e, kind = ?e.kind(), "Login failed");
                guard.finish(MutationStatus::Error(e.user_message()));
                Err(e.into())
            }
        }
    }
}
