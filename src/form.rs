//! In-memory form fields and the notifications they emit.

use crate::i18n::Language;
use crate::sync::{FormFields, Provenance};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Identifies the field an edit notification came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    /// The visible text field
    Visible,
    /// The hidden field holding the value for one language
    Hidden(Language),
    /// The control choosing which language is being edited
    LanguageSelector,
    /// Any other form control, by name
    Other(String),
}

/// A change notification emitted by a form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditNotification {
    pub target: FieldId,
    pub value: String,
    pub provenance: Provenance,
    /// Set by the form for controls that only choose a language. The
    /// unsaved-changes guard never treats these as edits.
    pub is_language_selector: bool,
}

impl EditNotification {
    pub fn new(target: FieldId, value: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            target,
            value: value.into(),
            provenance,
            is_language_selector: false,
        }
    }

    /// A user choosing a language in the language selector.
    pub fn language_selected(lang: Language) -> Self {
        Self {
            target: FieldId::LanguageSelector,
            value: lang.code().to_string(),
            provenance: Provenance::User,
            is_language_selector: true,
        }
    }
}

/// A form held entirely in memory.
///
/// Every set records a notification, both in a pending queue drained by the
/// event loop and in a permanent history.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    label: String,
    visible: String,
    placeholder: String,
    hidden: HashMap<Language, String>,
    pending: Vec<EditNotification>,
    history: Vec<EditNotification>,
}

impl MemoryForm {
    /// Create an empty form whose visible field is labelled `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Pre-fill the visible field without emitting a notification.
    pub fn with_visible(mut self, value: impl Into<String>) -> Self {
        self.visible = value.into();
        self
    }

    /// Add a hidden field for `lang` holding its stored value.
    pub fn with_hidden(mut self, lang: Language, value: impl Into<String>) -> Self {
        self.hidden.insert(lang, value.into());
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn hidden(&self, lang: Language) -> Option<&str> {
        self.hidden.get(&lang).map(String::as_str)
    }

    /// All hidden field values, ordered by language.
    pub fn hidden_values(&self) -> BTreeMap<Language, String> {
        self.hidden
            .iter()
            .map(|(lang, value)| (*lang, value.clone()))
            .collect()
    }

    /// Simulate the user typing into the visible field.
    pub fn user_edit_visible(&mut self, value: &str) {
        self.visible = value.to_string();
        self.record(EditNotification::new(FieldId::Visible, value, Provenance::User));
    }

    /// Simulate the user typing into the hidden field for `lang`.
    ///
    /// Returns `false` when the form has no such field.
    pub fn user_edit_hidden(&mut self, lang: Language, value: &str) -> bool {
        self.write_hidden(lang, value, Provenance::User)
    }

    /// Notifications emitted since the last call.
    pub fn take_notifications(&mut self) -> Vec<EditNotification> {
        std::mem::take(&mut self.pending)
    }

    /// Every notification ever emitted by this form.
    pub fn history(&self) -> &[EditNotification] {
        &self.history
    }

    fn write_hidden(&mut self, lang: Language, value: &str, provenance: Provenance) -> bool {
        match self.hidden.get_mut(&lang) {
            Some(slot) => {
                *slot = value.to_string();
                self.record(EditNotification::new(FieldId::Hidden(lang), value, provenance));
                true
            }
            None => false,
        }
    }

    fn record(&mut self, notification: EditNotification) {
        self.history.push(notification.clone());
        self.pending.push(notification);
    }
}

impl FormFields for MemoryForm {
    fn visible_value(&self) -> String {
        self.visible.clone()
    }

    fn set_visible_value(&mut self, value: &str, provenance: Provenance) {
        self.visible = value.to_string();
        self.record(EditNotification::new(FieldId::Visible, value, provenance));
    }

    fn hidden_value(&self, lang: Language) -> Option<String> {
        self.hidden.get(&lang).cloned()
    }

    fn set_hidden_value(&mut self, lang: Language, value: &str, provenance: Provenance) -> bool {
        self.write_hidden(lang, value, provenance)
    }

    fn set_placeholder(&mut self, lang: Language) {
        self.placeholder = format!("{} ({})", self.label, lang.name());
    }
}
