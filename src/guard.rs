//! Unsaved-changes guard for an admin change form.
//!
//! Tracks whether the user has edited the form since it was loaded or last
//! submitted, and decides when leaving the page needs a confirmation.

use crate::form::EditNotification;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_LEAVE_MESSAGE: &str =
    "You have unsaved changes. Leave this page? Your changes will be lost.";

/// A link the user clicked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkTarget {
    /// Raw `href` attribute, empty when absent
    pub href: String,
    /// The link opens in a new tab (`target="_blank"`)
    pub new_tab: bool,
    /// The link carries a `download` attribute
    pub download: bool,
    /// The link sits inside the form's submit row (save/continue buttons)
    pub in_submit_row: bool,
}

impl LinkTarget {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    /// Links that never leave the current page or never lose the form.
    fn is_harmless(&self) -> bool {
        self.new_tab
            || self.download
            || self.href.is_empty()
            || self.href.starts_with('#')
            || self.in_submit_row
    }
}

/// What to do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum NavigationDecision {
    /// Let the navigation happen
    Proceed,
    /// Ask the user first, showing `message`
    Confirm { message: String },
    /// The user chose to stay
    Block,
}

/// Dirty flag plus the rules for when it matters.
#[derive(Debug, Clone)]
pub struct DirtyGuard {
    dirty: bool,
    leave_message: String,
}

impl DirtyGuard {
    pub fn new(leave_message: impl Into<String>) -> Self {
        Self {
            dirty: false,
            leave_message: leave_message.into(),
        }
    }

    /// Record a field notification. Returns whether it marked the form dirty.
    ///
    /// Internal notifications and notifications from language selectors are
    /// ignored.
    pub fn observe(&mut self, notification: &EditNotification) -> bool {
        if notification.provenance.is_internal() || notification.is_language_selector {
            return false;
        }

        if !self.dirty {
            debug!(target_field = ?notification.target, "Form marked dirty");
        }
        self.dirty = true;
        true
    }

    /// The form is being submitted normally; nothing will be lost.
    pub fn on_submit(&mut self) {
        self.dirty = false;
    }

    /// Whether a refresh or tab close should show the browser's warning.
    pub fn before_unload(&self) -> bool {
        self.dirty
    }

    pub fn on_link_click(&self, link: &LinkTarget) -> NavigationDecision {
        if !self.dirty || link.is_harmless() {
            return NavigationDecision::Proceed;
        }

        NavigationDecision::Confirm {
            message: self.leave_message.clone(),
        }
    }

    /// Apply the user's answer to a confirmation.
    pub fn resolve_confirm(&mut self, leave: bool) -> NavigationDecision {
        if leave {
            info!("Leaving form with unsaved changes");
            self.dirty = false;
            NavigationDecision::Proceed
        } else {
            NavigationDecision::Block
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn reset(&mut self) {
        self.dirty = false;
    }
}

impl Default for DirtyGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LEAVE_MESSAGE)
    }
}
