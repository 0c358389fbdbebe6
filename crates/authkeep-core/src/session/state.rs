use std::fmt;

use serde::Serialize;

use crate::models::User;

/// Client-side belief about the session.
///
/// Starts `Uninitialized`, passes through `Initializing` once, then moves
/// between `Authenticated` and `Unauthenticated` for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    Authenticated(User),
    Unauthenticated,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// The initial identity check has not settled yet
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Uninitialized | SessionState::Initializing)
    }

    /// The initial identity check has settled, either way
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Unauthenticated => "unauthenticated",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Authenticated(user) => write!(f, "authenticated as {}", user.email),
            other => f.write_str(other.label()),
        }
    }
}
