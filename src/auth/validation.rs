//! Sous-applications et règles de mot de passe.

use crate::error::AppError;

pub const PASSWORD_MIN_LEN: usize = 8;

/// Sous-application à laquelle appartient une session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubApp {
    Json,
    Rest,
    Layered,
}

impl SubApp {
    pub const ALL: [SubApp; 3] = [SubApp::Json, SubApp::Rest, SubApp::Layered];

    /// Nom enregistré dans la session
    pub fn name(self) -> &'static str {
        match self {
            SubApp::Json => "json_app",
            SubApp::Rest => "rest",
            SubApp::Layered => "layered",
        }
    }

    /// Préfixe de route: `/json_app`, `/rest`, `/layered`
    pub fn prefix(self) -> String {
        format!("/{}", self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|app| app.name() == name)
    }

    pub fn password_max_len(self) -> usize {
        match self {
            SubApp::Json => 18,
            SubApp::Rest | SubApp::Layered => 14,
        }
    }

    pub fn home_url(self) -> String {
        format!("{}/profile", self.prefix())
    }

    pub fn logout_url(self) -> String {
        format!("{}/logout", self.prefix())
    }

    /// Confirmation, longueur (en caractères) puis composition
    pub fn validate_new_password(self, password1: &str, password2: &str) -> Result<(), AppError> {
        if password1 != password2 {
            return Err(AppError::validation("Passwords do not match."));
        }

        let max = self.password_max_len();
        let len = password1.chars().count();
        if !(PASSWORD_MIN_LEN..=max).contains(&len) {
            return Err(AppError::validation(format!(
                "Password must be between {PASSWORD_MIN_LEN} and {max} characters."
            )));
        }

        let has_letter = password1.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = password1.chars().any(|c| c.is_ascii_digit());
        let has_special = password1.chars().any(|c| c.is_ascii_punctuation());
        if !(has_letter && has_digit && has_special) {
            return Err(AppError::validation(
                "Password must include letters, numbers, and special characters.",
            ));
        }

        Ok(())
    }
}
