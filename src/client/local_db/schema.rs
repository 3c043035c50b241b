//! Database Schema Definitions
//!
//! Version 1 is the base schema in `schema.sql`, applied idempotently on
//! every open. Later versions carry their own DDL in [`migration_sql`].

/// Current database schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Schema migration versions
pub const MIGRATION_VERSIONS: &[i32] = &[1, 2];

/// Base schema, applied idempotently on every open
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Rows pulled out of the queue because they no longer decode.
///
/// Columns are kept as raw text so nothing is lost when the original row was
/// malformed.
const QUARANTINE_SQL: &str = "
CREATE TABLE IF NOT EXISTS quarantined_actions (
    seq INTEGER PRIMARY KEY,
    id TEXT NOT NULL,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    reason TEXT NOT NULL,
    quarantined_at TEXT NOT NULL
);
";

/// Check if database needs migration
pub fn needs_migration(current_version: i32) -> bool {
    current_version < CURRENT_SCHEMA_VERSION
}

/// Get pending migrations
pub fn get_pending_migrations(current_version: i32) -> Vec<i32> {
    MIGRATION_VERSIONS
        .iter()
        .filter(|&&v| v > current_version)
        .cloned()
        .collect()
}

/// DDL for one migration; `None` when the base schema already covers it
pub fn migration_sql(version: i32) -> Option<&'static str> {
    match version {
        2 => Some(QUARANTINE_SQL),
        _ => None,
    }
}
