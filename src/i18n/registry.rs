//! The languages an admin form can be edited in.
//!
//! Each registered language has one hidden field on the form and one option
//! in the edit-language selector. The registry fixes that set, the order the
//! selector lists it in, and which language a fresh form opens with. It is
//! built once on first access and shared for the life of the process.

use std::sync::OnceLock;

/// One editable language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 code; also the suffix of the hidden field and the URL prefix
    pub code: &'static str,

    /// English name, shown in the visible field's placeholder
    pub name: &'static str,

    /// The language a form opens with when no selection is supplied
    pub is_canonical: bool,

    /// Disabled languages stay in the URL-prefix set but cannot be selected
    pub enabled: bool,
}

/// The fixed set of editable languages, in selector order.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: selector_languages(),
        })
    }

    /// Look up a language by code, enabled or not.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Languages that get a hidden field and a selector option.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Every registered language. Used for URL prefix matching, where a
    /// disabled language's prefix must still be recognized.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// The default editing language.
    ///
    /// # Panics
    /// Panics unless exactly one language is marked canonical.
    pub fn canonical(&self) -> &LanguageConfig {
        let mut canonical = self.languages.iter().filter(|lang| lang.is_canonical);

        match (canonical.next(), canonical.next()) {
            (Some(config), None) => config,
            (None, _) => panic!("No canonical language found in registry"),
            (Some(_), Some(_)) => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// Options of the edit-language selector, in display order.
fn selector_languages() -> Vec<LanguageConfig> {
    [
        ("en", "English"),
        ("id", "Indonesian"),
        ("ja", "Japanese"),
        ("fr", "French"),
        ("de", "German"),
        ("es", "Spanish"),
    ]
    .into_iter()
    .map(|(code, name)| LanguageConfig {
        code,
        name,
        is_canonical: code == "en",
        enabled: true,
    })
    .collect()
}
