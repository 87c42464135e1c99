use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::middleware::trace::X_TRACE_ID;
use crate::routes::X_TRIAGE_DEGRADED;

/// CORS layer from `TRIAGE_CORS_ORIGINS`; an empty or unparsable list allows any origin.
///
/// The trace id and degraded-mode headers are exposed so browser clients can read them.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_headers(Any)
        .allow_methods(Any)
        .expose_headers([
            HeaderName::from_static(X_TRACE_ID),
            HeaderName::from_static(X_TRIAGE_DEGRADED),
        ]);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
