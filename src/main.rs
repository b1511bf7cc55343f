//! Replay an admin form script and print what happened.
//!
//! Usage:
//!   cargo run -- path/to/script.json
//!
//! The script describes the form's initial contents and a list of user
//! events (see `FormScript`). The report is printed to stdout as JSON.
//!
//! Optional environment variables:
//! - ADMIN_DEFAULT_LANGUAGE (defaults to en)
//! - ADMIN_FIELD_LABEL (defaults to Description)
//! - SET_LANGUAGE_URL (defaults to /i18n/setlang/)
//! - LEAVE_CONFIRM_MESSAGE

use admin_form_i18n::{config::Config, session::FormScript};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so the report on stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("admin_form_i18n=info".parse()?),
        )
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("Usage: admin-form-replay <script.json>")?;

    let config = Config::from_env()?;
    let script = FormScript::load(&path)?;

    info!("Replaying {} events from {}", script.events.len(), path.display());
    let report = script.replay(&config)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
