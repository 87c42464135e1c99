//! Request / response types for the ticket routes.

use serde::{Deserialize, Serialize};
use triage_core::{Category, Priority, Status};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::db::TicketRecord;

pub const MAX_TITLE_CHARS: u64 = 200;
pub const MAX_DESCRIPTION_CHARS: u64 = 32 * 1024;

pub const DEFAULT_LIMIT: u32 = 100;

/// Request body for `POST /tickets`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateTicketRequest {
    #[validate(
        length(min = 1, max = MAX_TITLE_CHARS),
        custom(function = "not_blank")
    )]
    pub title: String,
    /// Free-text problem statement; sent verbatim to the model.
    #[validate(
        length(min = 1, max = MAX_DESCRIPTION_CHARS),
        custom(function = "not_blank")
    )]
    pub description: String,
}

/// A stored ticket as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TicketResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub resolution: Option<String>,
}

/// Pagination for `GET /tickets`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTicketsQuery {
    /// Number of tickets to skip (default 0).
    pub skip: Option<u32>,
    /// Maximum number of tickets to return (default 100, must be positive).
    pub limit: Option<u32>,
}

impl TicketRecord {
    pub fn to_response(&self) -> TicketResponse {
        TicketResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            priority: self.priority,
            status: self.status,
            resolution: self.resolution.clone(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
