//! Application state management for Sprout.
//!
//! This module contains the `App` struct that owns the session store, the
//! login coordinator, the current route, and the login form's local input.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use sprout_core::{
    ApiClient, Config, LoginCoordinator, LoginCredentials, LoginError, LoginStatus,
    SecureStorage, Session, SessionStore, User,
};

use crate::routes::Route;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionStore,
    pub login: LoginCoordinator,

    // UI State
    pub route: Route,
    pub state: AppState,
    pub status_message: Option<String>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,

    // In-flight login attempt
    login_task: Option<JoinHandle<Result<User, LoginError>>>,

    // Session changes made outside the UI (e.g. another clone logging out)
    session_rx: watch::Receiver<Session>,
}

impl App {
    /// Create the app, restoring any persisted session from `storage`.
    pub fn new(config: Config, storage: Arc<dyn SecureStorage>) -> Result<Self> {
        let session = SessionStore::restore(storage);
        debug!(authenticated = session.is_authenticated(), "Session restored");

        let api = ApiClient::from_config(&config)?;
        debug!(base_url = api.base_url(), "API client configured");

        let login = LoginCoordinator::new(api, session.clone())
            .with_retry_policy(config.login_retry_policy());

        let login_email = config.last_email.clone().unwrap_or_default();
        let session_rx = session.subscribe();

        Ok(Self {
            config,
            session,
            login,

            route: Route::Index,
            state: AppState::Normal,
            status_message: None,

            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,

            login_task: None,
            session_rx,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Go to `route`, subject to the auth guard.
    pub fn navigate(&mut self, route: Route) {
        let resolved = route.resolve(self.session.is_authenticated());
        if resolved != route {
            debug!(requested = route.path(), resolved = resolved.path(), "Route redirected");
        }

        if resolved == Route::Login && self.route != Route::Login {
            self.start_login();
        }
        self.route = resolved;
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Prepare the login form.
    pub fn start_login(&mut self) {
        self.login.reset();
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    pub fn login_status(&self) -> LoginStatus {
        self.login.status()
    }

    /// Start a login attempt in the background. Ignored while one is
    /// already pending, so the submit action is effectively disabled.
    pub fn submit_login(&mut self) {
        if self.login.is_pending() || self.login_task.is_some() {
            debug!("Login already pending");
            return;
        }

        let credentials = LoginCredentials::new(self.login_email.clone(), self.login_password.clone());
        let login = self.login.clone();
        self.login_task = Some(tokio::spawn(async move { login.submit(credentials).await }));
    }

    /// Collect the result of a finished login attempt, if any.
    pub async fn check_background_tasks(&mut self) {
        if self.login_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = self.login_task.take() {
                match task.await {
                    Ok(Ok(user)) => self.on_login_success(user),
                    Ok(Err(e)) => debug!(error = %e, "Login attempt failed"),
                    Err(e) => warn!(error = %e, "Login task panicked or was cancelled"),
                }
            }
        }

        if self.session_rx.has_changed().unwrap_or(false) {
            let authenticated = self.session_rx.borrow_and_update().is_authenticated();
            if !authenticated && self.route.requires_auth() {
                self.navigate(self.route);
            }
        }
    }

    fn on_login_success(&mut self, user: User) {
        self.login_password.clear();
        self.status_message = None;

        self.config.last_email = Some(user.email.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!(user_id = %user.id, "Signed in");
        self.navigate(Route::Home);
    }

    /// Clear the session and return to the welcome screen.
    pub async fn logout(&mut self) {
        // Wait for the aborted task to finish so it cannot write a session
        // after the clear below
        if let Some(task) = self.login_task.take() {
            task.abort();
            if let Err(e) = task.await {
                debug!(cancelled = e.is_cancelled(), "Pending login stopped by logout");
            }
        }

        self.status_message = match self.session.clear_session().await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Signed out but the stored token could not be removed");
                Some("Signed out, but the saved token could not be removed".to_string())
            }
        };

        self.login.reset();
        self.navigate(Route::Index);
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
