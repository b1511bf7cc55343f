//! Site language switching.
//!
//! The site language dropdown posts the chosen language to the backend's
//! set-language endpoint and then navigates to the same page under the new
//! language prefix. This module builds that request and the redirect target;
//! sending it is up to the caller.

use crate::i18n::{Language, LanguageRegistry};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_SET_LANGUAGE_URL: &str = "/i18n/setlang/";

/// Content type of a set-language request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

static LANGUAGE_PREFIX_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches a leading `/<code>` segment for any registered language.
fn language_prefix_regex() -> &'static Regex {
    LANGUAGE_PREFIX_REGEX.get_or_init(|| {
        let codes: Vec<String> = LanguageRegistry::get()
            .list_all()
            .iter()
            .map(|lang| regex::escape(lang.code))
            .collect();
        Regex::new(&format!("^/({})(/|$)", codes.join("|")))
            .expect("language prefix pattern is built from escaped codes")
    })
}

/// Remove a leading language segment from `path`.
///
/// `/ja/rooms/` becomes `/rooms/`, `/ja` becomes `/`, and paths without a
/// language prefix are returned unchanged.
pub fn strip_language_prefix(path: &str) -> String {
    if path == "/" {
        return "/".to_string();
    }

    let stripped = language_prefix_regex().replace(path, "/");
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped.into_owned()
    }
}

/// The path of the current page under `lang`'s prefix.
pub fn localized_path(lang: Language, current_path: &str) -> String {
    format!("/{}{}", lang.code(), strip_language_prefix(current_path))
}

/// Body of a set-language request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetLanguageRequest {
    /// Endpoint the request is posted to
    #[serde(skip)]
    pub url: String,
    pub language: Language,
    /// Where the backend should send the user afterwards
    pub next: String,
}

impl SetLanguageRequest {
    /// `application/x-www-form-urlencoded` encoding of the request fields.
    pub fn form_body(&self) -> String {
        format!(
            "language={}&next={}",
            urlencoding::encode(self.language.code()),
            urlencoding::encode(&self.next)
        )
    }
}

/// Where to go after a successful language change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub location: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwitchError {
    #[error("Error changing language")]
    Rejected { status: u16 },
}

/// Builds set-language requests against one endpoint.
#[derive(Debug, Clone)]
pub struct LanguageSwitcher {
    set_language_url: String,
}

impl LanguageSwitcher {
    pub fn new(set_language_url: impl Into<String>) -> Self {
        Self {
            set_language_url: set_language_url.into(),
        }
    }

    /// Request switching to `lang` while on `current_path`.
    pub fn request(&self, lang: Language, current_path: &str) -> SetLanguageRequest {
        let next = localized_path(lang, current_path);
        debug!(
            current_path,
            base_path = %strip_language_prefix(current_path),
            next = %next,
            "Building set-language request"
        );

        SetLanguageRequest {
            url: self.set_language_url.clone(),
            language: lang,
            next,
        }
    }

    /// Interpret the endpoint's response status.
    pub fn handle_response(
        &self,
        status: u16,
        request: &SetLanguageRequest,
    ) -> Result<Redirect, SwitchError> {
        if (200..300).contains(&status) {
            Ok(Redirect {
                location: request.next.clone(),
            })
        } else {
            warn!(status, language = %request.language, "Set-language request rejected");
            Err(SwitchError::Rejected { status })
        }
    }
}

impl Default for LanguageSwitcher {
    fn default() -> Self {
        Self::new(DEFAULT_SET_LANGUAGE_URL)
    }
}
