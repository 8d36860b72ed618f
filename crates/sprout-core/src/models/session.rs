use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Token and user of a signed-in session. They only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
    pub signed_in_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(token: String, user: User) -> Self {
        Self {
            token,
            user,
            signed_in_at: Utc::now(),
        }
    }
}

/// Current authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    LoggedOut,
    Authenticated(AuthSession),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Authenticated(auth) => Some(auth.token.as_str()),
            Session::LoggedOut => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated(auth) => Some(&auth.user),
            Session::LoggedOut => None,
        }
    }

    pub fn auth(&self) -> Option<&AuthSession> {
        match self {
            Session::Authenticated(auth) => Some(auth),
            Session::LoggedOut => None,
        }
    }
}
