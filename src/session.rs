//! Event-loop driver for one admin form.
//!
//! `FormSession` plays the role of the browser: it applies user events to an
//! in-memory form, then delivers every notification the form emitted to the
//! unsaved-changes guard and the field synchronizer, in order, until no
//! notifications remain. Writes made by the synchronizer are internal, so
//! they are delivered too but end the cascade.

use crate::config::Config;
use crate::form::{EditNotification, FieldId, MemoryForm};
use crate::guard::{DirtyGuard, LinkTarget, NavigationDecision};
use crate::i18n::Language;
use crate::switcher::{LanguageSwitcher, FORM_CONTENT_TYPE};
use crate::sync::{FieldSynchronizer, FormFields, Provenance};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use tracing::{debug, info, warn};

/// Something the user does on the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FormEvent {
    /// Type into the visible field
    EditVisible { value: String },
    /// Type into the hidden field of one language
    EditHidden { language: String, value: String },
    /// Change any other form control
    EditOther { name: String, value: String },
    /// Choose the language being edited
    SelectLanguage { language: String },
    /// Submit the form
    Submit,
    /// Click a link on the page
    ClickLink { link: LinkTarget },
    /// Answer a leave confirmation
    ConfirmLeave { leave: bool },
    /// Refresh or close the tab
    Unload,
    /// Pick a language in the site language dropdown. `status` is the
    /// endpoint's response, when known.
    ChooseSiteLanguage {
        language: String,
        path: String,
        #[serde(default)]
        status: Option<u16>,
    },
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    Applied {
        dirty: bool,
    },
    Submitted {
        hidden: BTreeMap<Language, String>,
    },
    Navigation {
        decision: NavigationDecision,
    },
    Unload {
        warn: bool,
    },
    SiteLanguage {
        url: String,
        content_type: String,
        body: String,
        redirect: Option<String>,
        error: Option<String>,
    },
}

/// Observable state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub active: Language,
    pub visible: String,
    pub placeholder: String,
    pub hidden: BTreeMap<Language, String>,
    pub dirty: bool,
}

pub struct FormSession {
    sync: FieldSynchronizer<MemoryForm>,
    guard: DirtyGuard,
    switcher: LanguageSwitcher,
}

impl FormSession {
    pub fn new(form: MemoryForm, active: Language, config: &Config) -> Self {
        let mut session = Self {
            sync: FieldSynchronizer::initialize(form, active),
            guard: DirtyGuard::new(config.leave_message.clone()),
            switcher: LanguageSwitcher::new(config.set_language_url.clone()),
        };
        session.dispatch(Vec::new());
        session
    }

    /// Apply one user event and deliver the resulting notifications.
    pub fn apply(&mut self, event: FormEvent) -> Result<EventOutcome> {
        debug!(?event, "Applying form event");

        let outcome = match event {
            FormEvent::EditVisible { value } => {
                self.sync.form_mut().user_edit_visible(&value);
                self.dispatch(Vec::new());
                self.applied()
            }
            FormEvent::EditHidden { language, value } => {
                let lang = Language::from_code(&language)?;
                if !self.sync.form_mut().user_edit_hidden(lang, &value) {
                    warn!(language = %lang, "Form has no hidden field for language");
                }
                self.dispatch(Vec::new());
                self.applied()
            }
            FormEvent::EditOther { name, value } => {
                let notification =
                    EditNotification::new(FieldId::Other(name), value, Provenance::User);
                self.dispatch(vec![notification]);
                self.applied()
            }
            FormEvent::SelectLanguage { language } => {
                let lang = Language::from_code(&language)?;
                self.dispatch(vec![EditNotification::language_selected(lang)]);
                self.applied()
            }
            FormEvent::Submit => {
                self.sync.flush_all();
                self.dispatch(Vec::new());
                self.guard.on_submit();
                info!(active = %self.sync.active(), "Form submitted");
                EventOutcome::Submitted {
                    hidden: self.sync.form().hidden_values(),
                }
            }
            FormEvent::ClickLink { link } => EventOutcome::Navigation {
                decision: self.guard.on_link_click(&link),
            },
            FormEvent::ConfirmLeave { leave } => EventOutcome::Navigation {
                decision: self.guard.resolve_confirm(leave),
            },
            FormEvent::Unload => EventOutcome::Unload {
                warn: self.guard.before_unload(),
            },
            FormEvent::ChooseSiteLanguage {
                language,
                path,
                status,
            } => {
                let lang = Language::from_code(&language)?;
                let request = self.switcher.request(lang, &path);
                let (redirect, error) = match status {
                    Some(status) => match self.switcher.handle_response(status, &request) {
                        Ok(redirect) => (Some(redirect.location), None),
                        Err(e) => (None, Some(e.to_string())),
                    },
                    None => (None, None),
                };
                EventOutcome::SiteLanguage {
                    url: request.url.clone(),
                    content_type: FORM_CONTENT_TYPE.to_string(),
                    body: request.form_body(),
                    redirect,
                    error,
                }
            }
        };

        Ok(outcome)
    }

    /// Apply events in order, stopping at the first invalid one.
    pub fn run(&mut self, events: Vec<FormEvent>) -> Result<Vec<EventOutcome>> {
        events
            .into_iter()
            .enumerate()
            .map(|(index, event)| {
                self.apply(event)
                    .with_context(|| format!("Event #{} could not be applied", index + 1))
            })
            .collect()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let form = self.sync.form();
        FormSnapshot {
            active: self.sync.active(),
            visible: form.visible_value(),
            placeholder: form.placeholder().to_string(),
            hidden: form.hidden_values(),
            dirty: self.guard.is_dirty(),
        }
    }

    fn applied(&self) -> EventOutcome {
        EventOutcome::Applied {
            dirty: self.guard.is_dirty(),
        }
    }

    /// Deliver `initial` and everything the form emits until the queue drains.
    fn dispatch(&mut self, initial: Vec<EditNotification>) {
        let mut queue: VecDeque<EditNotification> = initial.into();
        queue.extend(self.sync.form_mut().take_notifications());

        while let Some(notification) = queue.pop_front() {
            self.guard.observe(&notification);

            match &notification.target {
                FieldId::Visible => self
                    .sync
                    .on_visible_edit(&notification.value, notification.provenance),
                FieldId::Hidden(lang) => {
                    self.sync
                        .on_hidden_edit(*lang, &notification.value, notification.provenance)
                }
                FieldId::LanguageSelector => match Language::from_code(&notification.value) {
                    Ok(lang) => self.sync.switch_language(lang),
                    Err(e) => warn!("Ignoring language selection: {}", e),
                },
                FieldId::Other(_) => {}
            }

            queue.extend(self.sync.form_mut().take_notifications());
        }
    }
}

/// A form's initial contents plus the events to replay against it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormScript {
    /// Initially selected language; the configured default when absent
    pub active: Option<String>,
    /// Pre-filled visible field
    pub visible: String,
    /// Stored hidden field values by language code. Languages not listed
    /// have no hidden field on the form.
    pub hidden: BTreeMap<String, String>,
    pub events: Vec<FormEvent>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub outcomes: Vec<EventOutcome>,
    pub final_state: FormSnapshot,
}

impl FormScript {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse form script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read form script {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Build the session described by this script, returning it with the
    /// events still to replay.
    pub fn into_session(self, config: &Config) -> Result<(FormSession, Vec<FormEvent>)> {
        let active = match &self.active {
            Some(code) => Language::from_code(code).context("Invalid initial language")?,
            None => config.default_language,
        };

        let mut form = MemoryForm::new(config.field_label.clone()).with_visible(self.visible);
        for (code, value) in self.hidden {
            let lang = Language::from_code(&code)
                .with_context(|| format!("Invalid hidden field language '{}'", code))?;
            form = form.with_hidden(lang, value);
        }

        Ok((FormSession::new(form, active, config), self.events))
    }

    /// Build the session, apply every event, and report the results.
    pub fn replay(self, config: &Config) -> Result<ReplayReport> {
        let (mut session, events) = self.into_session(config)?;
        let outcomes = session.run(events)?;
        Ok(ReplayReport {
            outcomes,
            final_state: session.snapshot(),
        })
    }
}
