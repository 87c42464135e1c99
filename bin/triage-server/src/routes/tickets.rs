//! Ticket routes.
//!
//! `POST /tickets` runs the triage pipeline on the description, persists the
//! result and returns it. `GET /tickets` pages through stored tickets in
//! insertion order.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, warn};
use utoipa::OpenApi;
use validator::Validate;

use crate::db::{NewTicket, TicketStore};
use crate::error::ServerError;
use crate::schemas::tickets::{CreateTicketRequest, ListTicketsQuery, TicketResponse, DEFAULT_LIMIT};
use crate::state::AppState;

/// Set to `true` on a created ticket when any model call fell back.
pub const X_TRIAGE_DEGRADED: &str = "x-triage-degraded";

#[derive(OpenApi)]
#[openapi(
    paths(create_ticket, list_tickets),
    components(schemas(
        CreateTicketRequest,
        TicketResponse,
        triage_core::Category,
        triage_core::Priority,
        triage_core::Status
    ))
)]
pub struct TicketsApi;

/// Register ticket routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/tickets", post(create_ticket).get(list_tickets))
}

/// Submit a new ticket.
///
/// The description is classified, prioritised and answered by the model;
/// the derived status and the suggested response are stored with it.
#[utoipa::path(
    post,
    path = "/tickets",
    tag = "tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 422, description = "Missing or invalid fields"),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTicketRequest>,
) -> Result<Response, ServerError> {
    req.validate()?;

    let triage = state.pipeline.triage(&req.description).await;
    if triage.degraded {
        warn!("ticket triaged in degraded mode; model replies were replaced by fallback text");
    }

    let record = state
        .store
        .create_ticket(NewTicket {
            title: req.title,
            description: req.description,
            category: triage.category,
            priority: triage.priority,
            status: triage.status,
            resolution: Some(triage.resolution),
        })
        .await?;
    info!(ticket_id = record.id, status = %record.status, "ticket created");

    let mut response = (StatusCode::CREATED, Json(record.to_response())).into_response();
    if triage.degraded {
        response
            .headers_mut()
            .insert(X_TRIAGE_DEGRADED, HeaderValue::from_static("true"));
    }
    Ok(response)
}

/// List stored tickets.
#[utoipa::path(
    get,
    path = "/tickets",
    tag = "tickets",
    params(ListTicketsQuery),
    responses(
        (status = 200, description = "Tickets in insertion order", body = Vec<TicketResponse>),
        (status = 400, description = "Invalid pagination"),
        (status = 500, description = "Storage error"),
    )
)]
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<Vec<TicketResponse>>, ServerError> {
    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if limit == 0 {
        return Err(ServerError::BadRequest("limit must be greater than zero".into()));
    }

    let tickets = state
        .store
        .list_tickets(i64::from(skip), i64::from(limit))
        .await?;
    Ok(Json(tickets.iter().map(|t| t.to_response()).collect()))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use triage_core::{CompletionModel, LlmError, Pipeline};

    use super::*;
    use crate::config::Config;
    use crate::db::sqlite::SqliteStore;

    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl CompletionModel for Scripted {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::MissingCredential))
        }
    }

    async fn app(replies: Vec<&str>) -> (Router, Arc<AppState>, Arc<Scripted>) {
        let model = Arc::new(Scripted {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_owned())).collect()),
            calls: Mutex::default(),
        });
        let mut config = Config::from_lookup(|_| None);
        config.enable_swagger = false;
        let state = Arc::new(AppState {
            config: Arc::new(config),
            store: Arc::new(SqliteStore::in_memory().await.unwrap()),
            pipeline: Pipeline::new(model.clone()),
        });
        (crate::routes::build(state.clone()), state, model)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn urgent_billing_ticket_is_escalated_and_listed() {
        let (app, _, _) = app(vec![
            "billing",
            "high",
            "Your ticket has been escalated to the billing team.",
        ])
        .await;

        let created = app
            .clone()
            .oneshot(post_json(
                "/tickets",
                json!({
                    "title": "Urgent Billing Issue",
                    "description": "I have an urgent problem with my recent invoice payment."
                }),
            ))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        assert!(created.headers().get(X_TRIAGE_DEGRADED).is_none());
        let ticket = body_json(created).await;
        assert_eq!(ticket["title"], "Urgent Billing Issue");
        assert_eq!(ticket["category"], "billing");
        assert_eq!(ticket["priority"], "high");
        assert_eq!(ticket["status"], "escalated");
        assert!(ticket["resolution"].as_str().unwrap().contains("escalated"));

        let listed = app
            .oneshot(Request::get("/tickets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(listed.status(), StatusCode::OK);
        assert_eq!(body_json(listed).await, json!([ticket]));
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let (app, _, _) = app(vec![]).await;
        let response = app
            .oneshot(
                Request::get("/tickets?skip=0&limit=100")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn missing_description_is_rejected_before_pipeline() {
        let (app, state, model) = app(vec!["billing", "high", "escalated"]).await;
        let response = app
            .oneshot(post_json("/tickets", json!({ "title": "No body" })))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        assert_eq!(*model.calls.lock().unwrap(), 0);
        assert!(state.store.list_tickets(0, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_description_fails_validation() {
        let (app, state, model) = app(vec![]).await;
        let response = app
            .oneshot(post_json("/tickets", json!({ "title": "t", "description": "   " })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["error"].is_string());
        assert_eq!(*model.calls.lock().unwrap(), 0);
        assert!(state.store.list_tickets(0, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_ticket_is_refused_before_pipeline() {
        let (app, state, model) = app(vec!["billing", "high", "escalated"]).await;
        let description = "x".repeat(crate::middleware::trace::MAX_REQUEST_BODY_BYTES);
        let response = app
            .oneshot(post_json(
                "/tickets",
                json!({ "title": "Huge", "description": description }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(*model.calls.lock().unwrap(), 0);
        assert!(state.store.list_tickets(0, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn model_outage_is_flagged_as_degraded() {
        let (app, _, model) = app(vec![]).await;
        let response = app
            .oneshot(post_json(
                "/api/tickets",
                json!({ "title": "Printer", "description": "The printer is on fire." }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[X_TRIAGE_DEGRADED], "true");
        let ticket = body_json(response).await;
        assert_eq!(ticket["category"], "general");
        assert_eq!(ticket["priority"], "low");
        assert_eq!(ticket["status"], "escalated");
        assert_eq!(ticket["resolution"], "general");
        assert_eq!(*model.calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn suggested_solution_resolves_ticket() {
        let (app, _, _) = app(vec![
            "technical",
            "medium",
            "Suggested Solution: reset your password from the login page.",
        ])
        .await;
        let response = app
            .oneshot(post_json(
                "/tickets",
                json!({ "title": "Locked out", "description": "I forgot my password." }),
            ))
            .await
            .unwrap();

        let ticket = body_json(response).await;
        assert_eq!(ticket["category"], "technical");
        assert_eq!(ticket["priority"], "medium");
        assert_eq!(ticket["status"], "resolved");
    }

    #[tokio::test]
    async fn pagination_is_validated_and_applied() {
        let (app, state, _) = app(vec![]).await;
        for title in ["a", "b", "c"] {
            state
                .store
                .create_ticket(NewTicket {
                    title: title.into(),
                    description: "d".into(),
                    category: Default::default(),
                    priority: Default::default(),
                    status: Default::default(),
                    resolution: None,
                })
                .await
                .unwrap();
        }

        let page = app
            .clone()
            .oneshot(Request::get("/tickets?skip=1&limit=1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let page = body_json(page).await;
        assert_eq!(page.as_array().unwrap().len(), 1);
        assert_eq!(page[0]["title"], "b");
        assert_eq!(page[0]["status"], "open");
        assert!(page[0]["resolution"].is_null());

        let zero = app
            .clone()
            .oneshot(Request::get("/tickets?limit=0").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

        let negative = app
            .oneshot(Request::get("/tickets?skip=-1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn root_probe_and_trace_id() {
        let (app, _, _) = app(vec![]).await;
        let trace_id = "6f1c2d3e-4b5a-4c7d-8e9f-0a1b2c3d4e5f";
        let response = app
            .oneshot(
                Request::get("/")
                    .header(crate::middleware::trace::X_TRACE_ID, trace_id)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[crate::middleware::trace::X_TRACE_ID], trace_id);
        assert_eq!(body_json(response).await, json!({ "status": "API is running" }));
    }
}
