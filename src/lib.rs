//! A small relay that takes newsletter sign-ups from a trusted site and forwards them
//! to the configured provider (MailerLite or Buttondown).

pub mod app;
pub mod config;
mod error;
pub mod provider;
pub mod provider_client;
pub mod web;

pub use app::{serve, App, AppState};
pub use error::{Error, Result};
pub use provider_client::ProviderClient;

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "subrelay=debug,tower_http=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Compact, human readable output for local runs.
pub fn init_dbg_tracing() {
    // Ignore the error if a subscriber is already set (tests call this repeatedly).
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(env_filter())
        .compact()
        .try_init();
}

/// JSON lines for whatever collects the logs in production.
pub fn init_production_tracing() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(env_filter())
        .try_init();
}
