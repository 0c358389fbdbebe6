//! User-facing fallback texts.
//!
//! Used whenever the API gives no `detail` of its own, and for failures that
//! never reach the API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "en" => Some(Locale::En),
            "ru" => Some(Locale::Ru),
            _ => None,
        }
    }
}

/// Which gateway operation a fallback message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    CurrentUser,
    Refresh,
    Logout,
}

#[derive(Debug, Clone, Copy)]
pub struct Messages {
    locale: Locale,
}

impl Messages {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn fallback(&self, op: Operation) -> &'static str {
        match (self.locale, op) {
            (Locale::En, Operation::Login) => "Could not sign in",
            (Locale::En, Operation::Register) => "Could not complete registration",
            (Locale::En, Operation::CurrentUser) => "Could not load account details",
            (Locale::En, Operation::Refresh) => "Could not renew the session",
            (Locale::En, Operation::Logout) => "Could not sign out",
            (Locale::Ru, Operation::Login) => "Произошла ошибка при попытке входа",
            (Locale::Ru, Operation::Register) => "Произошла ошибка при попытке регистрации",
            (Locale::Ru, Operation::CurrentUser) => "Произошла ошибка при получении данных",
            (Locale::Ru, Operation::Refresh) => {
                "Произошла ошибка при обновлении авторизационных данных"
            }
            (Locale::Ru, Operation::Logout) => "Произошла ошибка при выходе из системы",
        }
    }

    pub fn no_refresh_token(&self) -> &'static str {
        match self.locale {
            Locale::En => "No stored credentials to renew the session",
            Locale::Ru => "Не найдены данные для авторизации",
        }
    }

    pub fn password_mismatch(&self) -> &'static str {
        match self.locale {
            Locale::En => "Passwords do not match",
            Locale::Ru => "Пароли не совпадают",
        }
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
