//! Versioned schema migrations.
//!
//! Applied versions are recorded in `schema_version`; each migration runs
//! exactly once per database file.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use tracing::info;

/// Bump when adding a migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Highest applied version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Applies every pending migration. Safe to call on every startup.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Global history")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Per-site permission decisions")?;
    }

    if current < CURRENT_SCHEMA_VERSION {
        info!(from = current, to = CURRENT_SCHEMA_VERSION, "database migrated");
    }
    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, now, description],
    )?;
    Ok(())
}

/// V1: visited pages, one row per url.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS history (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            tab_id TEXT,
            favicon TEXT,
            visit_time INTEGER NOT NULL,
            visit_count INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_history_visit_time ON history(visit_time);
        ",
    )
}

/// V2: stored grant/deny decisions keyed by hostname.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS site_permissions (
            id TEXT PRIMARY KEY,
            site TEXT NOT NULL,
            permission_type TEXT NOT NULL,
            status TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(site, permission_type)
        );

        CREATE INDEX IF NOT EXISTS idx_site_permissions_site ON site_permissions(site);
        ",
    )
}
