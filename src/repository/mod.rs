//! Repository layer for database persistence.
//!
//! All database access uses Diesel ORM with compile-time query checking on
//! SQLite. Each operation commits as its own atomic unit; callers never
//! observe partial writes.

pub mod jobs;
pub mod migrations;
pub mod pool;
pub mod records;
pub mod scan_state;

pub use jobs::JobRepository;
pub use migrations::run_migrations;
pub use pool::{AsyncSqlitePool, DieselError};
pub use scan_state::ScanStateRepository;

use chrono::{DateTime, Utc};

/// Fixed owner id for single-owner deployments. The schema keeps an
/// owner_id column for compatibility with a multi-owner layout.
pub const OWNER_ID: i32 = 1;

/// Parse a datetime string from the database, defaulting to Unix epoch on error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}
