use crate::routes::{health, tickets};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "triage-server",
    description = "Support ticket triage API",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(tickets::TicketsApi::openapi());
    root
}
