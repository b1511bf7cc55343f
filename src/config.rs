use crate::guard::DEFAULT_LEAVE_MESSAGE;
use crate::i18n::Language;
use crate::switcher::DEFAULT_SET_LANGUAGE_URL;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Form
    pub default_language: Language,
    pub field_label: String,

    // Language switching
    pub set_language_url: String,

    // Unsaved-changes guard
    pub leave_message: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_language = match std::env::var("ADMIN_DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(code.trim())
                .context("ADMIN_DEFAULT_LANGUAGE is not a supported language")?,
            Err(_) => Language::canonical(),
        };

        Ok(Self {
            default_language,
            field_label: std::env::var("ADMIN_FIELD_LABEL")
                .unwrap_or_else(|_| "Description".to_string()),

            set_language_url: std::env::var("SET_LANGUAGE_URL")
                .unwrap_or_else(|_| DEFAULT_SET_LANGUAGE_URL.to_string()),

            leave_message: std::env::var("LEAVE_CONFIRM_MESSAGE")
                .unwrap_or_else(|_| DEFAULT_LEAVE_MESSAGE.to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: Language::canonical(),
            field_label: "Description".to_string(),
            set_language_url: DEFAULT_SET_LANGUAGE_URL.to_string(),
            leave_message: DEFAULT_LEAVE_MESSAGE.to_string(),
        }
    }
}
