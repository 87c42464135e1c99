//! SQLite implementation of [`TicketStore`].
//!
//! Migrations are embedded at compile time from `./migrations` (relative to
//! the crate root) and run on every connect. Queries use the runtime-checked
//! `sqlx::query` form so no `DATABASE_URL` is needed at build time.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::warn;

use super::{NewTicket, TicketRecord, TicketStore};

type TicketRow = (i64, String, String, String, String, String, Option<String>);

/// SQLite-backed ticket store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// The parent directory of a file database is created when missing.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }
        let pool = SqlitePool::connect_with(options).await?;
        Self::migrate(pool).await
    }

    /// A private in-memory database on a single pinned connection.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

impl TicketStore for SqliteStore {
    async fn create_ticket(&self, ticket: NewTicket) -> Result<TicketRecord, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO tickets (title, description, category, priority, status, resolution) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.category.to_string())
        .bind(ticket.priority.to_string())
        .bind(ticket.status.to_string())
        .bind(&ticket.resolution)
        .execute(&self.pool)
        .await?;

        Ok(TicketRecord {
            id: result.last_insert_rowid(),
            title: ticket.title,
            description: ticket.description,
            category: ticket.category,
            priority: ticket.priority,
            status: ticket.status,
            resolution: ticket.resolution,
        })
    }

    async fn list_tickets(&self, offset: i64, limit: i64) -> Result<Vec<TicketRecord>, sqlx::Error> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            "SELECT id, title, description, category, priority, status, resolution \
             FROM tickets ORDER BY id ASC LIMIT ?1 OFFSET ?2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ticket_from_row).collect())
    }
}

fn ticket_from_row(
    (id, title, description, category, priority, status, resolution): TicketRow,
) -> TicketRecord {
    TicketRecord {
        id,
        title,
        description,
        category: parse_or_default(id, "category", &category),
        priority: parse_or_default(id, "priority", &priority),
        status: parse_or_default(id, "status", &status),
        resolution,
    }
}

fn parse_or_default<T: FromStr + Default>(id: i64, column: &str, raw: &str) -> T {
    raw.parse().unwrap_or_else(|_| {
        warn!(ticket_id = id, column, raw, "unrecognised stored value; using default");
        T::default()
    })
}
