//! Client-side logic for multilingual admin change forms.
//!
//! - `sync`: mirrors one visible text field against hidden per-language fields
//! - `guard`: unsaved-changes tracking and leave confirmation
//! - `switcher`: site language switching requests and redirects
//! - `session`: event-loop driver tying the above to an in-memory form

pub mod config;
pub mod form;
pub mod guard;
pub mod i18n;
pub mod session;
pub mod switcher;
pub mod sync;
