use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Access/refresh credentials issued by the API. Both tokens are opaque.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "access")]
    pub access_token: String,
    /// Empty when the server did not rotate the refresh token.
    #[serde(rename = "refresh", default)]
    pub refresh_token: String,
    pub token_type: String,
    #[serde(rename = "exp", with = "super::timestamp")]
    pub expires_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub issued_at: DateTime<Utc>,
    pub token_id: String,
}

impl TokenPair {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Lifetime the server granted the access token
    pub fn lifetime(&self) -> Duration {
        self.expires_at - self.issued_at
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token_type", &self.token_type)
            .field("token_id", &self.token_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Login response: the token pair with the embedded account summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_JSON: &str = r#"{
        "access": "acc-123",
        "refresh": "ref-456",
        "token_type": "bearer",
        "exp": "2099-01-01T00:15:00Z",
        "issued_at": "2099-01-01T00:00:00Z",
        "token_id": "tid-1",
        "user": {"id": 3, "email": "user@example.com", "role": "user", "can_login": true}
    }"#;

    #[test]
    fn test_parse_login_response() {
        let resp: LoginResponse =
            serde_json::from_str(LOGIN_JSON).expect("Failed to parse login test JSON");
        assert_eq!(resp.tokens.access_token, "acc-123");
        assert_eq!(resp.tokens.refresh_token, "ref-456");
        assert_eq!(resp.tokens.lifetime(), Duration::minutes(15));
        assert!(!resp.tokens.is_expired());
        assert_eq!(resp.user.id, 3);
    }

    #[test]
    fn test_refresh_token_optional() {
        let json = r#"{"access": "a", "token_type": "bearer", "exp": "2000-01-01T00:00:00", "issued_at": "2000-01-01T00:00:00", "token_id": "t"}"#;
        let pair: TokenPair = serde_json::from_str(json).unwrap();
        assert!(pair.refresh_token.is_empty());
        assert!(pair.is_expired());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let resp: LoginResponse = serde_json::from_str(LOGIN_JSON).unwrap();
        let printed = format!("{:?}", resp.tokens);
        assert!(!printed.contains("acc-123"));
        assert!(!printed.contains("ref-456"));
        assert!(printed.contains("tid-1"));
    }
}
