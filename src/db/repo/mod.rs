//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `categories.rs` - Category lookup and lazy creation
//! - `projects.rs` - Project CRUD and calendar-period queries
//! - `travels.rs` - Travel record CRUD and period aggregation

mod categories;
mod projects;
mod travels;

use crate::domain::{parse_flexible_date, Travel};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }
}

/// Map a joined travels/categories row into a `Travel` with its category
/// populated. Expects `category_name` aliased in the SELECT.
fn travel_from_row(row: &SqliteRow) -> Travel {
    let id: String = row.get("id");
    let date_str: String = row.get("date");
    let date = parse_stored_date(&id, &date_str);
    let category_id: String = row.get("category_id");
    let category_name: String = row.get("category_name");

    Travel {
        id,
        name: row.get("name"),
        description: row.get("description"),
        amount: row.get("amount"),
        date,
        category_id: category_id.clone(),
        user_id: row.get("user_id"),
        project_id: row.get("project_id"),
        category: Some(crate::domain::Category {
            id: category_id,
            name: category_name,
        }),
    }
}

fn parse_stored_date(id: &str, date_str: &str) -> DateTime<Utc> {
    parse_flexible_date(date_str).unwrap_or_else(|| {
        warn!(
            travel_id = %id,
            date = %date_str,
            "Failed to parse stored travel date, using epoch"
        );
        DateTime::<Utc>::UNIX_EPOCH
    })
}
