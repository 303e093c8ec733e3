use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AuditAction;

/// A lifecycle event handed to the audit sink after commit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AuditEvent {
    pub request_id: String,
    pub user_id: Option<String>,
    pub action: AuditAction,
    pub details: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

/// A persisted audit log row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AuditEntry {
    pub id: String,
    pub request_id: String,
    pub user_id: Option<String>,
    pub action: AuditAction,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
