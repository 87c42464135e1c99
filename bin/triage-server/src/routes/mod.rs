//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection, body size cap)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with `TRIAGE_ENABLE_SWAGGER=false`)
//! - Liveness routes
//! - Ticket routes, served at the root and again under `/api`

pub mod doc;
mod health;
mod tickets;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

pub use tickets::X_TRIAGE_DEGRADED;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(tickets::router())
        .nest("/api", tickets::router());

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        .layer(DefaultBodyLimit::max(trace::MAX_REQUEST_BODY_BYTES))
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
