use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account summary returned alongside issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub can_login: bool,
}

/// Full account view returned by the current-user lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub is_active: bool,
    #[serde(with = "super::timestamp")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub registered_at: DateTime<Utc>,
    #[serde(default, with = "super::timestamp::option")]
    #[cfg_attr(feature = "ts", ts(type = "string | null"))]
    pub locked_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_login_attempts: u32,
}

impl UserDetail {
    /// Project down to the summary form held in session state.
    pub fn summary(&self) -> User {
        self.user.clone()
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map(|until| until > now).unwrap_or(false)
    }
}

impl From<UserDetail> for User {
    fn from(detail: UserDetail) -> Self {
        detail.user
    }
}
