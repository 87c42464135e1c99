//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use triage_core::Pipeline;

use crate::config::Config;
use crate::db::sqlite::SqliteStore;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Ticket persistence.
    pub store: Arc<SqliteStore>,
    /// Triage pipeline bound to the configured completion model.
    pub pipeline: Pipeline,
}
