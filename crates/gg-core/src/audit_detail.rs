//! Typed audit detail payloads.
//!
//! Each audit action carries a structured `detail` JSON blob. These types
//! fix the shape of the payloads the lifecycle emits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::RequestStatus;

/// Detail for `AuditAction::RequestAssigned`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AssignedDetail {
    pub assignment_id: String,
    pub assigned_to: String,
    pub assigned_to_name: String,
    pub assigned_by_name: String,
    pub previous_status: RequestStatus,
    pub new_status: RequestStatus,
}

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: RequestStatus,
    pub to: RequestStatus,
}

/// Detail for `AuditAction::AssignmentCompleted`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CompletedDetail {
    pub assignment_id: String,
    pub notes: Option<String>,
}

/// Detail for `AuditAction::RequestCreated`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CreatedDetail {
    pub equipment_id: String,
    pub team_id: String,
    pub title: String,
}

/// Detail for `AuditAction::RequestUpdated`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UpdatedDetail {
    /// Names of the edited fields.
    pub fields: Vec<String>,
}
