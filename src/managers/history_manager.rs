//! Global browsing history.
//!
//! Consumes the `add-history-item` notifications the shell emits on every
//! finished load of a non-internal location and persists them in SQLite.
//! Unlike per-tab shadow history, entries survive tab close.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::errors::HistoryError;
use crate::types::history::{GlobalHistoryItem, HistoryEntry};
use crate::types::tab::is_internal_url;

/// Trait defining history management operations.
pub trait HistoryManagerTrait {
    fn record_visit(
        &mut self,
        url: &str,
        title: &str,
        tab_id: Option<&str>,
        favicon: Option<&str>,
    ) -> Result<String, HistoryError>;
    fn record_item(&mut self, item: &GlobalHistoryItem) -> Result<Option<String>, HistoryError>;
    fn search_history(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn list_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn delete_entry(&mut self, id: &str) -> Result<(), HistoryError>;
    fn clear_all(&mut self) -> Result<(), HistoryError>;
    fn is_recording_enabled(&self) -> bool;
    fn set_recording_enabled(&mut self, enabled: bool);
}

/// History store backed by the shared database.
pub struct HistoryManager {
    db: Arc<Database>,
    recording_enabled: bool,
}

const SELECT_COLUMNS: &str = "SELECT id, url, title, tab_id, favicon, visit_time, visit_count FROM history";

impl HistoryManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            recording_enabled: true,
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        Ok(HistoryEntry {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            tab_id: row.get(3)?,
            favicon: row.get(4)?,
            visit_time: row.get(5)?,
            visit_count: row.get(6)?,
        })
    }
}

impl HistoryManagerTrait for HistoryManager {
    /// Records a visit. A url seen before gets its visit count bumped and its
    /// title, tab and favicon refreshed. Returns the entry id.
    fn record_visit(
        &mut self,
        url: &str,
        title: &str,
        tab_id: Option<&str>,
        favicon: Option<&str>,
    ) -> Result<String, HistoryError> {
        if !self.recording_enabled {
            return Err(HistoryError::RecordingDisabled);
        }
        let conn = self.db.connection();
        let now = Self::now();

        let existing: Option<String> = conn
            .query_row("SELECT id FROM history WHERE url = ?1", params![url], |row| row.get(0))
            .optional()?;

        match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE history SET visit_count = visit_count + 1, visit_time = ?1, title = ?2, \
                     tab_id = COALESCE(?3, tab_id), favicon = COALESCE(?4, favicon) WHERE id = ?5",
                    params![now, title, tab_id, favicon, id],
                )?;
                Ok(id)
            }
            None => {
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO history (id, url, title, tab_id, favicon, visit_time, visit_count) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
                    params![id, url, title, tab_id, favicon, now],
                )?;
                Ok(id)
            }
        }
    }

    /// Stores one shell notification. Internal locations and disabled
    /// recording are skipped with `Ok(None)`.
    fn record_item(&mut self, item: &GlobalHistoryItem) -> Result<Option<String>, HistoryError> {
        if is_internal_url(&item.url) || !self.recording_enabled {
            debug!(url = %item.url, "history item skipped");
            return Ok(None);
        }
        let title = if item.title.is_empty() { &item.url } else { &item.title };
        self.record_visit(
            &item.url,
            title,
            Some(item.tab_id.as_str()),
            item.favicon.as_deref(),
        )
        .map(Some)
    }

    /// Entries whose title or url contains `query`, newest first.
    fn search_history(&self, query: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let pattern = format!("%{}%", query);
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE title LIKE ?1 OR url LIKE ?1 ORDER BY visit_time DESC, rowid DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![pattern], Self::row_to_entry)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY visit_time DESC, rowid DESC LIMIT ?1",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_entry)?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    fn delete_entry(&mut self, id: &str) -> Result<(), HistoryError> {
        let affected = self
            .db
            .connection()
            .execute("DELETE FROM history WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(HistoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.db.connection().execute("DELETE FROM history", [])?;
        Ok(())
    }

    fn is_recording_enabled(&self) -> bool {
        self.recording_enabled
    }

    fn set_recording_enabled(&mut self, enabled: bool) {
        self.recording_enabled = enabled;
    }
}
