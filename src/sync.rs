//! Per-language field synchronization.
//!
//! A multilingual form shows one visible text field and keeps one hidden
//! field per language. `FieldSynchronizer` mirrors the visible field into the
//! hidden field of the active language, mirrors user edits of the active
//! hidden field back into the visible field, and swaps the visible content
//! when the active language changes.
//!
//! Every write the synchronizer performs is tagged `Provenance::Internal`.
//! Fields emit a notification on every set, so the tag is what keeps those
//! notifications from re-entering the synchronizer or marking the form dirty.

use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Where an edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Typed or pasted by the user
    User,
    /// Written by the synchronizer itself
    Internal,
}

impl Provenance {
    pub fn is_internal(self) -> bool {
        matches!(self, Provenance::Internal)
    }
}

/// Access to the fields of a form.
///
/// Implementations emit an edit notification carrying `provenance` on every
/// set, whether the value changed or not.
pub trait FormFields {
    /// Current content of the visible field.
    fn visible_value(&self) -> String;

    fn set_visible_value(&mut self, value: &str, provenance: Provenance);

    /// Current content of the hidden field for `lang`, or `None` if the form
    /// has no hidden field for it.
    fn hidden_value(&self, lang: Language) -> Option<String>;

    /// Write the hidden field for `lang`.
    ///
    /// Returns `false` when the form has no such field and the write was dropped.
    fn set_hidden_value(&mut self, lang: Language, value: &str, provenance: Provenance) -> bool;

    /// Update the language-dependent placeholder of the visible field.
    fn set_placeholder(&mut self, lang: Language);
}

/// Keeps a visible field and the hidden per-language fields of one form in sync.
///
/// After every operation the visible value equals `cache[active]` (or is
/// empty when the slot is absent), and `cache[active]` equals the last value
/// written to the hidden field of the active language.
#[derive(Debug)]
pub struct FieldSynchronizer<F: FormFields> {
    form: F,
    cache: HashMap<Language, String>,
    active: Language,
}

impl<F: FormFields> FieldSynchronizer<F> {
    /// Take ownership of `form` and bring it into a synchronized state.
    ///
    /// The cache is seeded from every non-empty hidden field. A pre-filled
    /// visible field seeds the active slot only when no hidden value exists
    /// for it.
    pub fn initialize(form: F, initial_active: Language) -> Self {
        let mut cache = HashMap::new();
        for lang in Language::enabled() {
            if let Some(value) = form.hidden_value(lang).filter(|v| !v.is_empty()) {
                cache.insert(lang, value);
            }
        }

        let mut sync = Self {
            form,
            cache,
            active: initial_active,
        };

        let visible = sync.form.visible_value();
        if !visible.is_empty() && !sync.cache.contains_key(&initial_active) {
            debug!(language = %initial_active, "Seeding cache from pre-filled visible field");
            sync.cache.insert(initial_active, visible.clone());
            sync.write_hidden(initial_active, &visible);
        }

        sync.load_visible(initial_active);
        sync.form.set_placeholder(initial_active);

        debug!(
            language = %initial_active,
            cached = sync.cache.len(),
            "Field synchronizer initialized"
        );
        sync
    }

    /// Handle a change of the visible field.
    pub fn on_visible_edit(&mut self, new_value: &str, provenance: Provenance) {
        if provenance.is_internal() {
            return;
        }

        self.cache.insert(self.active, new_value.to_string());
        self.write_hidden(self.active, new_value);
    }

    /// Handle a change of the hidden field for `lang`.
    pub fn on_hidden_edit(&mut self, lang: Language, new_value: &str, provenance: Provenance) {
        if provenance.is_internal() {
            return;
        }

        self.cache.insert(lang, new_value.to_string());
        if lang == self.active {
            self.form.set_visible_value(new_value, Provenance::Internal);
        }
    }

    /// Make `new_lang` the active language.
    ///
    /// The outgoing language's visible text is saved first. Every write made
    /// here is internal, so switching never marks the form dirty.
    pub fn switch_language(&mut self, new_lang: Language) {
        if new_lang == self.active {
            return;
        }

        self.flush_visible();

        debug!(from = %self.active, to = %new_lang, "Switching edit language");
        self.active = new_lang;
        self.load_visible(new_lang);
        self.form.set_placeholder(new_lang);
    }

    /// Write every cached value into its hidden field.
    ///
    /// Call before the form is serialized for submission. Languages that were
    /// edited through their hidden field but never made active are included.
    pub fn flush_all(&mut self) {
        self.flush_visible();

        let mut entries: Vec<(Language, String)> = self
            .cache
            .iter()
            .map(|(lang, value)| (*lang, value.clone()))
            .collect();
        entries.sort_by_key(|(lang, _)| *lang);

        for (lang, value) in &entries {
            self.write_hidden(*lang, value);
        }

        debug!(languages = entries.len(), "Flushed cached values to hidden fields");
    }

    pub fn active(&self) -> Language {
        self.active
    }

    /// Cached value for `lang`, distinguishing an explicit empty string from absence.
    pub fn cached(&self, lang: Language) -> Option<&str> {
        self.cache.get(&lang).map(String::as_str)
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    fn flush_visible(&mut self) {
        let value = self.form.visible_value();
        self.cache.insert(self.active, value.clone());
        self.write_hidden(self.active, &value);
    }

    /// Load the visible field for `lang`: cache, then the raw hidden value, then empty.
    fn load_visible(&mut self, lang: Language) {
        let value = match self.cache.get(&lang) {
            Some(cached) => cached.clone(),
            None => {
                let raw = self.form.hidden_value(lang).unwrap_or_default();
                if !raw.is_empty() {
                    self.cache.insert(lang, raw.clone());
                }
                raw
            }
        };

        self.form.set_visible_value(&value, Provenance::Internal);
    }

    fn write_hidden(&mut self, lang: Language, value: &str) {
        if !self.form.set_hidden_value(lang, value, Provenance::Internal) {
            debug!(language = %lang, "No hidden field for language, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MemoryForm;

    fn form_with(hidden: &[(Language, &str)]) -> MemoryForm {
        let mut form = MemoryForm::new("Description");
        for (lang, value) in hidden {
            form = form.with_hidden(*lang, *value);
        }
        form
    }

    fn all_hidden() -> MemoryForm {
        let mut form = MemoryForm::new("Description");
        for lang in Language::enabled() {
            form = form.with_hidden(lang, "");
        }
        form
    }

    fn assert_invariant(sync: &FieldSynchronizer<MemoryForm>) {
        let active = sync.active();
        let expected = sync.cached(active).unwrap_or("");
        assert_eq!(sync.form().visible_value(), expected);
    }

    // ==================== initialize Tests ====================

    #[test]
    fn test_initialize_seeds_non_empty_hidden_values() {
        let form = form_with(&[
            (Language::ENGLISH, ""),
            (Language::JAPANESE, "こんにちは"),
        ]);
        let sync = FieldSynchronizer::initialize(form, Language::ENGLISH);

        assert_eq!(sync.cached(Language::JAPANESE), Some("こんにちは"));
        assert_eq!(sync.cached(Language::ENGLISH), None);
        assert_eq!(sync.form().visible_value(), "");
        assert_invariant(&sync);
    }

    #[test]
    fn test_initialize_loads_active_language() {
        let form = form_with(&[(Language::FRENCH, "Bonjour")]);
        let sync = FieldSynchronizer::initialize(form, Language::FRENCH);

        assert_eq!(sync.form().visible_value(), "Bonjour");
        assert_eq!(sync.form().placeholder(), "Description (French)");
    }

    #[test]
    fn test_initialize_prefilled_visible_seeds_absent_slot() {
        let form = form_with(&[(Language::ENGLISH, "")]).with_visible("Draft");
        let sync = FieldSynchronizer::initialize(form, Language::ENGLISH);

        assert_eq!(sync.cached(Language::ENGLISH), Some("Draft"));
        assert_eq!(sync.form().visible_value(), "Draft");
        assert_eq!(sync.form().hidden(Language::ENGLISH), Some("Draft"));
    }

    #[test]
    fn test_initialize_hidden_value_wins_over_prefilled_visible() {
        let form = form_with(&[(Language::ENGLISH, "Stored")]).with_visible("Draft");
        let sync = FieldSynchronizer::initialize(form, Language::ENGLISH);

        assert_eq!(sync.form().visible_value(), "Stored");
        assert_eq!(sync.form().hidden(Language::ENGLISH), Some("Stored"));
    }

    #[test]
    fn test_initialize_emits_only_internal_notifications() {
        let form = form_with(&[(Language::ENGLISH, "")]).with_visible("Draft");
        let sync = FieldSynchronizer::initialize(form, Language::ENGLISH);

        assert!(!sync.form().history().is_empty());
        assert!(sync
            .form()
            .history()
            .iter()
            .all(|n| n.provenance == Provenance::Internal));
    }

    // ==================== Edit Tests ====================

    #[test]
    fn test_visible_edit_updates_cache_and_hidden() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::ENGLISH);
        sync.form_mut().user_edit_visible("Hello");
        sync.on_visible_edit("Hello", Provenance::User);

        assert_eq!(sync.cached(Language::ENGLISH), Some("Hello"));
        assert_eq!(sync.form().hidden(Language::ENGLISH), Some("Hello"));
        assert_invariant(&sync);
    }

    #[test]
    fn test_internal_visible_edit_is_ignored() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::ENGLISH);
        sync.on_visible_edit("Programmatic", Provenance::Internal);

        assert_eq!(sync.cached(Language::ENGLISH), None);
        assert_eq!(sync.form().hidden(Language::ENGLISH), Some(""));
    }

    #[test]
    fn test_hidden_edit_for_active_language_updates_visible() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::GERMAN);
        sync.form_mut().user_edit_hidden(Language::GERMAN, "Hallo");
        sync.on_hidden_edit(Language::GERMAN, "Hallo", Provenance::User);

        assert_eq!(sync.form().visible_value(), "Hallo");
        assert_eq!(sync.cached(Language::GERMAN), Some("Hallo"));
        assert_invariant(&sync);
    }

    #[test]
    fn test_hidden_edit_for_other_language_leaves_visible() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::GERMAN);
        sync.form_mut().user_edit_hidden(Language::FRENCH, "Bonjour");
        sync.on_hidden_edit(Language::FRENCH, "Bonjour", Provenance::User);

        assert_eq!(sync.form().visible_value(), "");
        assert_eq!(sync.cached(Language::FRENCH), Some("Bonjour"));
    }

    #[test]
    fn test_internal_hidden_edit_is_ignored() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::GERMAN);
        sync.on_hidden_edit(Language::GERMAN, "Hallo", Provenance::Internal);

        assert_eq!(sync.form().visible_value(), "");
        assert_eq!(sync.cached(Language::GERMAN), None);
    }

    // ==================== switch_language Tests ====================

    #[test]
    fn test_switch_to_same_language_is_noop() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::ENGLISH);
        let before = sync.form().history().len();
        sync.switch_language(Language::ENGLISH);

        assert_eq!(sync.form().history().len(), before);
    }

    #[test]
    fn test_switch_saves_outgoing_and_loads_incoming() {
        let form = form_with(&[
            (Language::ENGLISH, ""),
            (Language::JAPANESE, "こんにちは"),
        ]);
        let mut sync = FieldSynchronizer::initialize(form, Language::ENGLISH);
        sync.form_mut().user_edit_visible("Hello");
        sync.on_visible_edit("Hello", Provenance::User);

        sync.switch_language(Language::JAPANESE);
        assert_eq!(sync.form().visible_value(), "こんにちは");
        assert_eq!(sync.form().hidden(Language::ENGLISH), Some("Hello"));
        assert_eq!(sync.form().placeholder(), "Description (Japanese)");

        sync.switch_language(Language::ENGLISH);
        assert_eq!(sync.form().visible_value(), "Hello");
        assert_invariant(&sync);
    }

    #[test]
    fn test_switch_preserves_explicit_empty_cache_entry() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::ENGLISH);
        sync.switch_language(Language::SPANISH);

        // The hidden field changes behind the cache's back; the explicit
        // empty entry from the flush still wins.
        sync.form_mut().user_edit_hidden(Language::ENGLISH, "Stale");
        sync.switch_language(Language::ENGLISH);

        assert_eq!(sync.form().visible_value(), "");
    }

    #[test]
    fn test_switch_falls_back_to_raw_hidden_value() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::ENGLISH);
        sync.form_mut().user_edit_hidden(Language::SPANISH, "Hola");

        sync.switch_language(Language::SPANISH);

        assert_eq!(sync.form().visible_value(), "Hola");
        assert_eq!(sync.cached(Language::SPANISH), Some("Hola"));
        assert_invariant(&sync);
    }

    #[test]
    fn test_round_trip_through_language_without_hidden_field() {
        let form = form_with(&[(Language::ENGLISH, "")]).with_visible("Draft");
        let mut sync = FieldSynchronizer::initialize(form, Language::ENGLISH);

        sync.switch_language(Language::JAPANESE);
        assert_eq!(sync.form().visible_value(), "");
        assert_eq!(sync.form().hidden(Language::JAPANESE), None);

        sync.switch_language(Language::ENGLISH);
        assert_eq!(sync.form().visible_value(), "Draft");
        assert_eq!(sync.form().hidden(Language::ENGLISH), Some("Draft"));
    }

    #[test]
    fn test_switch_to_language_without_hidden_field() {
        let form = form_with(&[(Language::ENGLISH, "Hello")]);
        let mut sync = FieldSynchronizer::initialize(form, Language::ENGLISH);

        sync.switch_language(Language::INDONESIAN);
        assert_eq!(sync.form().visible_value(), "");

        sync.form_mut().user_edit_visible("Halo");
        sync.on_visible_edit("Halo", Provenance::User);
        assert_eq!(sync.cached(Language::INDONESIAN), Some("Halo"));
        assert_eq!(sync.form().hidden(Language::INDONESIAN), None);
        assert_invariant(&sync);
    }

    // ==================== flush_all Tests ====================

    #[test]
    fn test_flush_all_writes_never_active_language() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::GERMAN);
        sync.form_mut().user_edit_hidden(Language::FRENCH, "Bonjour");
        sync.on_hidden_edit(Language::FRENCH, "Bonjour", Provenance::User);
        // Something else clobbers the field before submission.
        sync.form_mut().user_edit_hidden(Language::FRENCH, "");

        sync.flush_all();

        assert_eq!(sync.form().hidden(Language::FRENCH), Some("Bonjour"));
    }

    #[test]
    fn test_flush_all_is_idempotent() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::ENGLISH);
        sync.form_mut().user_edit_visible("Hello");
        sync.on_visible_edit("Hello", Provenance::User);
        sync.switch_language(Language::JAPANESE);

        sync.flush_all();
        let first = sync.form().hidden_values();
        sync.flush_all();

        assert_eq!(sync.form().hidden_values(), first);
    }

    #[test]
    fn test_flush_all_notifications_are_internal() {
        let mut sync = FieldSynchronizer::initialize(all_hidden(), Language::ENGLISH);
        sync.form_mut().take_notifications();

        sync.flush_all();

        let pending = sync.form_mut().take_notifications();
        assert!(!pending.is_empty());
        assert!(pending.iter().all(|n| n.provenance.is_internal()));
    }
}
