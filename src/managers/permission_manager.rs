//! Per-site permission decisions.
//!
//! Decisions are keyed by hostname and stored in SQLite. The shell consults
//! them through [`PermissionDecider`] whenever a surface asks for a
//! capability; anything without a stored `granted` decision is denied and no
//! prompt is raised.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::errors::PermissionError;
use crate::types::permission::{PermissionDecision, PermissionStatus, PermissionType, SitePermission};

/// Decision function the shell applies to capability requests.
pub trait PermissionDecider {
    fn decide(&self, requesting_url: &str, permission: PermissionType) -> PermissionDecision;
}

/// Decider with no stored decisions: everything is denied.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAll;

impl PermissionDecider for DenyAll {
    fn decide(&self, _requesting_url: &str, _permission: PermissionType) -> PermissionDecision {
        PermissionDecision::Deny
    }
}

/// Trait defining permission management operations.
pub trait PermissionManagerTrait {
    fn set_permission(
        &mut self,
        site: &str,
        permission: PermissionType,
        status: PermissionStatus,
    ) -> Result<(), PermissionError>;
    fn get_permission(&self, site: &str, permission: PermissionType) -> Option<PermissionStatus>;
    fn get_site_permissions(&self, site: &str) -> Result<Vec<SitePermission>, PermissionError>;
    fn list_all_permissions(&self) -> Result<Vec<SitePermission>, PermissionError>;
    fn remove_site(&mut self, site: &str) -> Result<usize, PermissionError>;
    fn clear_all(&mut self) -> Result<(), PermissionError>;
}

/// Hostname of a requesting url, the key decisions are stored under.
pub fn site_of(requesting_url: &str) -> Option<String> {
    Url::parse(requesting_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Permission store backed by the shared database.
pub struct PermissionManager {
    db: Arc<Database>,
}

impl PermissionManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn now_ts() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_permission(row: &rusqlite::Row) -> rusqlite::Result<Option<SitePermission>> {
        let type_str: String = row.get(1)?;
        let status_str: String = row.get(2)?;
        let (Ok(permission_type), Ok(status)) = (
            type_str.parse::<PermissionType>(),
            status_str.parse::<PermissionStatus>(),
        ) else {
            return Ok(None);
        };
        Ok(Some(SitePermission {
            site: row.get(0)?,
            permission_type,
            status,
            updated_at: row.get(3)?,
        }))
    }

    fn collect(&self, sql: &str, site: Option<&str>) -> Result<Vec<SitePermission>, PermissionError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(sql)?;
        let rows = match site {
            Some(s) => stmt.query_map(params![s], Self::row_to_permission)?.collect::<Vec<_>>(),
            None => stmt.query_map([], Self::row_to_permission)?.collect::<Vec<_>>(),
        };
        let mut result = Vec::new();
        for row in rows {
            if let Some(p) = row? {
                result.push(p);
            }
        }
        Ok(result)
    }
}

impl PermissionManagerTrait for PermissionManager {
    fn set_permission(
        &mut self,
        site: &str,
        permission: PermissionType,
        status: PermissionStatus,
    ) -> Result<(), PermissionError> {
        if site.trim().is_empty() {
            return Err(PermissionError::InvalidSite(site.to_string()));
        }
        let conn = self.db.connection();
        let now = Self::now_ts();

        let updated = conn.execute(
            "UPDATE site_permissions SET status = ?1, updated_at = ?2 WHERE site = ?3 AND permission_type = ?4",
            params![status.as_str(), now, site, permission.as_str()],
        )?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO site_permissions (id, site, permission_type, status, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![Uuid::new_v4().to_string(), site, permission.as_str(), status.as_str(), now],
            )?;
        }
        Ok(())
    }

    fn get_permission(&self, site: &str, permission: PermissionType) -> Option<PermissionStatus> {
        self.db
            .connection()
            .query_row(
                "SELECT status FROM site_permissions WHERE site = ?1 AND permission_type = ?2",
                params![site, permission.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .ok()
            .flatten()
            .and_then(|s| s.parse().ok())
    }

    fn get_site_permissions(&self, site: &str) -> Result<Vec<SitePermission>, PermissionError> {
        self.collect(
            "SELECT site, permission_type, status, updated_at FROM site_permissions \
             WHERE site = ?1 ORDER BY permission_type",
            Some(site),
        )
    }

    fn list_all_permissions(&self) -> Result<Vec<SitePermission>, PermissionError> {
        self.collect(
            "SELECT site, permission_type, status, updated_at FROM site_permissions \
             ORDER BY site, permission_type",
            None,
        )
    }

    /// Forgets every decision for `site`. Returns how many were removed.
    fn remove_site(&mut self, site: &str) -> Result<usize, PermissionError> {
        let removed = self
            .db
            .connection()
            .execute("DELETE FROM site_permissions WHERE site = ?1", params![site])?;
        Ok(removed)
    }

    fn clear_all(&mut self) -> Result<(), PermissionError> {
        self.db.connection().execute("DELETE FROM site_permissions", [])?;
        Ok(())
    }
}

impl PermissionDecider for PermissionManager {
    fn decide(&self, requesting_url: &str, permission: PermissionType) -> PermissionDecision {
        let decision = match site_of(requesting_url).and_then(|site| self.get_permission(&site, permission)) {
            Some(PermissionStatus::Granted) => PermissionDecision::Grant,
            _ => PermissionDecision::Deny,
        };
        debug!(%requesting_url, %permission, ?decision, "permission decided");
        decision
    }
}
