use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RequestStatus;

/// The single technician bound to a request. Created once, never deleted;
/// only the completion fields are filled in later.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Assignment {
    pub id: String,
    pub request_id: String,
    pub assigned_to: String,
    pub assigned_by: String,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Assignment {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Result of a successful assignment, enriched with display data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AssignmentReceipt {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub assigned_to_name: String,
    pub assigned_to_email: Option<String>,
    pub assigned_by_name: String,
    pub request_status: RequestStatus,
}
