//! Internationalization (i18n) module for the languages an admin form edits.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their metadata
//! - `language`: Type-safe, validated `Language` used as the key for every
//!   per-language field and cache slot
//!
//! # Example
//!
//! ```rust,ignore
//! use admin_form_i18n::i18n::{Language, LanguageRegistry};
//!
//! let japanese = Language::from_code("ja")?;
//! let languages = LanguageRegistry::get().list_enabled();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
