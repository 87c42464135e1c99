//! Database abstraction layer.
//!
//! [`TicketStore`] defines the persistence interface for tickets. The default
//! implementation is [`sqlite::SqliteStore`]; to swap databases, implement
//! [`TicketStore`] for the new type and change the concrete type in
//! [`crate::state::AppState`].
//!
//! Trait methods use `impl Future` in their signatures so no `async-trait`
//! crate is required.

pub mod sqlite;

use std::future::Future;

use triage_core::{Category, Priority, Status};

/// A ticket about to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub resolution: Option<String>,
}

/// A row in the `tickets` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub resolution: Option<String>,
}

/// Ticket persistence. Tickets are inserted once and never updated or deleted.
pub trait TicketStore: Send + Sync + 'static {
    /// Insert a ticket and return it with its assigned id.
    fn create_ticket(
        &self,
        ticket: NewTicket,
    ) -> impl Future<Output = Result<TicketRecord, sqlx::Error>> + Send;

    /// Tickets in insertion order, skipping `offset` and returning at most `limit`.
    fn list_tickets(
        &self,
        offset: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<TicketRecord>, sqlx::Error>> + Send;
}
