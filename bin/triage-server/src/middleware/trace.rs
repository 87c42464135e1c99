use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ServerError;

pub const X_TRACE_ID: &str = "x-trace-id";

/// Largest request body the server will buffer. Also installed as the
/// extractor limit so both layers reject at the same size.
pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// JSON bodies below this size have their contents logged at `debug`.
const MAX_LOGGED_BODY_BYTES: usize = 1024;

/// Wrap each request in an `http_request` span keyed by a trace id.
///
/// The id comes from an incoming `x-trace-id` header when it is a valid UUID
/// and is echoed on the response. Request bodies over
/// [`MAX_REQUEST_BODY_BYTES`] are refused with 413 before any handler runs.
pub async fn trace_middleware(req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let mut response = match read_request_body(body).await {
            Ok(req_bytes) => {
                log_body("request", &parts.headers, &req_bytes);
                let mut req = Request::from_parts(parts, Body::from(req_bytes));
                if let Some(v) = header_value.clone() {
                    req.headers_mut().insert(X_TRACE_ID, v);
                }

                let response = next.run(req).await;

                let (parts, body) = response.into_parts();
                let res_bytes = match body.collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(e) => {
                        warn!(error = %e, "failed to buffer response body");
                        Bytes::new()
                    }
                };
                log_body("response", &parts.headers, &res_bytes);
                Response::from_parts(parts, Body::from(res_bytes))
            }
            Err(e) => {
                warn!(error = %e, "request body rejected");
                e.into_response()
            }
        };
        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Collect a request body, stopping at [`MAX_REQUEST_BODY_BYTES`].
async fn read_request_body(body: Body) -> Result<Bytes, ServerError> {
    match Limited::new(body, MAX_REQUEST_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => {
            Err(ServerError::PayloadTooLarge(MAX_REQUEST_BODY_BYTES))
        }
        Err(e) => Err(ServerError::BadRequest(format!("failed to read request body: {e}"))),
    }
}

/// Record size and type at `info`; small JSON contents only at `debug`.
fn log_body(direction: &str, headers: &header::HeaderMap, bytes: &Bytes) {
    if bytes.is_empty() {
        return;
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    info!(direction, content_type, size = bytes.len(), "body");

    if content_type.contains("application/json") && bytes.len() < MAX_LOGGED_BODY_BYTES {
        if let Ok(text) = std::str::from_utf8(bytes) {
            debug!(direction, body = text, "body contents");
        }
    }
}
