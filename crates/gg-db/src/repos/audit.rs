//! Audit log repository.
//!
//! Append-only rows written by [`crate::audit::SqlAuditSink`], read back with
//! optional filters.

use gg_core::entities::{AuditEntry, AuditEvent};
use gg_core::enums::AuditAction;
use gg_core::ids::PREFIX_AUDIT;

use crate::GearDb;
use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::GearService;

/// Filter criteria for audit queries.
#[derive(Debug, Default, Clone)]
pub struct AuditFilter {
    pub request_id: Option<String>,
    pub user_id: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<u32>,
}

impl GearDb {
    /// Append one audit row for `event`. Returns the new entry id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if id generation or the INSERT fails.
    pub async fn append_audit(&self, event: &AuditEvent) -> Result<String, DatabaseError> {
        let id = self.generate_id(PREFIX_AUDIT).await?;
        self.execute_write(
            "INSERT INTO audit_log (id, request_id, user_id, action, details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                id.as_str(),
                event.request_id.as_str(),
                event.user_id.as_deref(),
                event.action.as_str(),
                event.details.to_string(),
                event.occurred_at.to_rfc3339()
            ],
        )
        .await?;
        Ok(id)
    }
}

impl GearService {
    /// Query audit entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref rid) = filter.request_id {
            params.push(libsql::Value::Text(rid.clone()));
            conditions.push(format!("request_id = ?{}", params.len()));
        }
        if let Some(ref uid) = filter.user_id {
            params.push(libsql::Value::Text(uid.clone()));
            conditions.push(format!("user_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, request_id, user_id, action, details, created_at
             FROM audit_log {where_clause}
             ORDER BY created_at ASC, rowid ASC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(AuditEntry {
                id: row.get::<String>(0)?,
                request_id: row.get::<String>(1)?,
                user_id: get_opt_string(&row, 2)?,
                action: parse_enum(&row.get::<String>(3)?)?,
                details: parse_optional_json(get_opt_string(&row, 4)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(5)?)?,
            });
        }
        Ok(entries)
    }
}
