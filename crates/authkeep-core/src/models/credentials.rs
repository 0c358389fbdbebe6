use std::fmt;

use serde::Serialize;

/// Login input. Never persisted.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Trim both fields and lower-case the email. Password case is preserved.
    pub fn normalized(&self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Registration payload, sent as `{email, password, password_confirm}`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirm: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            password_confirm: password_confirm.into(),
        }
    }

    pub fn normalized(&self) -> Self {
        Self {
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
            password_confirm: self.password_confirm.trim().to_string(),
        }
    }

    /// Exact comparison. Check this on the raw input, before `normalized`.
    pub fn passwords_match(&self) -> bool {
        self.password == self.password_confirm
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_normalized() {
        let creds = Credentials::new(" USER@Example.com ", " secret ").normalized();
        assert_eq!(creds.email, "user@example.com");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_credentials_password_case_preserved() {
        let creds = Credentials::new("a@b.com", "  S3cReT  ").normalized();
        assert_eq!(creds.password, "S3cReT");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.com", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("a@b.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_registration_serializes_wire_names() {
        let reg = Registration::new("a@b.com", "p1", "p1");
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json["password_confirm"], "p1");
        assert_eq!(json["email"], "a@b.com");
    }

    #[test]
    fn test_registration_passwords_compared_exactly() {
        assert!(Registration::new("a@b.com", "p1", "p1").passwords_match());
        assert!(!Registration::new("a@b.com", "p1", "p2").passwords_match());
        assert!(!Registration::new("a@b.com", "p1 ", "p1").passwords_match());
    }

    #[test]
    fn test_registration_normalized_trims_passwords() {
        let reg = Registration::new(" New@Example.com", " pw ", " pw ").normalized();
        assert_eq!(reg.email, "new@example.com");
        assert_eq!(reg.password, "pw");
        assert_eq!(reg.password_confirm, "pw");
    }
}
