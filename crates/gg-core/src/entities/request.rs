use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Assignment;
use crate::enums::{Priority, RequestKind, RequestStatus};
use crate::errors::CoreError;
use crate::sla::{SlaClock, SlaView};

const MIN_TITLE_CHARS: usize = 5;
const MIN_DESCRIPTION_CHARS: usize = 10;

/// A maintenance work item. Never deleted; terminal rows stay as history.
///
/// `team_id` is copied from the equipment at creation and does not follow
/// later equipment reassignment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MaintenanceRequest {
    pub id: String,
    pub equipment_id: String,
    pub team_id: String,
    pub kind: RequestKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: RequestStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sla_hours: f64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    /// SLA position at `now`, or `None` once the request is terminal.
    #[must_use]
    pub fn sla(&self, clock: &SlaClock, now: DateTime<Utc>) -> Option<SlaView> {
        clock.evaluate(self.created_at, self.sla_hours, self.status, now)
    }

    /// An open request whose scheduled time has passed.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.scheduled_at.is_some_and(|at| at < now)
    }
}

/// Intake payload for a new request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NewRequest {
    pub equipment_id: String,
    pub kind: RequestKind,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Falls back to the configured default budget when absent.
    #[serde(default)]
    pub sla_hours: Option<f64>,
    pub created_by: String,
}

impl NewRequest {
    /// Check the field-level intake rules against the current time.
    ///
    /// Equipment and creator existence are checked by the store.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first rule that fails.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.equipment_id.trim().is_empty() {
            return Err(CoreError::Validation("Equipment ID is required".into()));
        }
        if self.created_by.trim().is_empty() {
            return Err(CoreError::Validation("Created by user ID is required".into()));
        }
        check_title(&self.title)?;
        check_description(&self.description)?;
        if self.kind == RequestKind::Preventive {
            check_preventive_schedule(self.scheduled_at, now)?;
        }
        if let Some(hours) = self.sla_hours {
            check_sla_hours(hours)?;
        }
        Ok(())
    }
}

/// Edit of an open request's descriptive fields. `None` leaves a field as is.
///
/// The kind, equipment, team and status are not editable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RequestUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Drop the schedule. Not allowed for preventive requests.
    #[serde(default)]
    pub clear_schedule: bool,
    #[serde(default)]
    pub sla_hours: Option<f64>,
}

impl RequestUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.scheduled_at.is_none()
            && !self.clear_schedule
            && self.sla_hours.is_none()
    }

    /// Check the edit against the intake rules for a request of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first rule that fails.
    pub fn validate(&self, kind: RequestKind, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::Validation("No fields to update".into()));
        }
        if self.clear_schedule && self.scheduled_at.is_some() {
            return Err(CoreError::Validation(
                "Cannot set and clear the scheduled date at once".into(),
            ));
        }
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(description) = &self.description {
            check_description(description)?;
        }
        if kind == RequestKind::Preventive {
            if self.clear_schedule {
                check_preventive_schedule(None, now)?;
            }
            if self.scheduled_at.is_some() {
                check_preventive_schedule(self.scheduled_at, now)?;
            }
        }
        if let Some(hours) = self.sla_hours {
            check_sla_hours(hours)?;
        }
        Ok(())
    }

    /// `request` with this edit applied. Text fields are trimmed.
    #[must_use]
    pub fn apply(&self, request: &MaintenanceRequest, now: DateTime<Utc>) -> MaintenanceRequest {
        let mut updated = request.clone();
        if let Some(title) = &self.title {
            updated.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(priority) = self.priority {
            updated.priority = priority;
        }
        if self.clear_schedule {
            updated.scheduled_at = None;
        } else if self.scheduled_at.is_some() {
            updated.scheduled_at = self.scheduled_at;
        }
        if let Some(hours) = self.sla_hours {
            updated.sla_hours = hours;
        }
        updated.updated_at = now;
        updated
    }

    /// Names of the fields this edit touches, for the audit trail.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.scheduled_at.is_some() || self.clear_schedule {
            fields.push("scheduled_at");
        }
        if self.sla_hours.is_some() {
            fields.push("sla_hours");
        }
        fields.into_iter().map(String::from).collect()
    }
}

fn check_title(title: &str) -> Result<(), CoreError> {
    if title.trim().chars().count() < MIN_TITLE_CHARS {
        return Err(CoreError::Validation(format!(
            "Title must be at least {MIN_TITLE_CHARS} characters"
        )));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), CoreError> {
    if description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(CoreError::Validation(format!(
            "Description must be at least {MIN_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(())
}

fn check_preventive_schedule(
    scheduled_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    match scheduled_at {
        None => Err(CoreError::Validation(
            "Preventive maintenance requests must have a scheduled date".into(),
        )),
        Some(at) if at <= now => Err(CoreError::Validation(
            "Scheduled date must be in the future for preventive maintenance".into(),
        )),
        Some(_) => Ok(()),
    }
}

fn check_sla_hours(hours: f64) -> Result<(), CoreError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(CoreError::Validation(format!(
            "SLA hours must be a positive number, got {hours}"
        )));
    }
    Ok(())
}

/// Read model for a single request: stored fields plus derived state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub assignment: Option<Assignment>,
    /// Absent once the request is terminal.
    pub sla: Option<SlaView>,
    pub is_overdue: bool,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn corrective(now: DateTime<Utc>) -> NewRequest {
        NewRequest {
            equipment_id: "eqp-00000001".into(),
            kind: RequestKind::Corrective,
            title: "Hydraulic leak".into(),
            description: "Press 4 is leaking fluid under load".into(),
            priority: None,
            scheduled_at: Some(now - Duration::hours(1)),
            sla_hours: None,
            created_by: "usr-00000001".into(),
        }
    }

    fn request(now: DateTime<Utc>, status: RequestStatus) -> MaintenanceRequest {
        MaintenanceRequest {
            id: "req-00000001".into(),
            equipment_id: "eqp-00000001".into(),
            team_id: "tem-00000001".into(),
            kind: RequestKind::Corrective,
            title: "Hydraulic leak".into(),
            description: "Press 4 is leaking fluid under load".into(),
            priority: Priority::High,
            status,
            scheduled_at: Some(now - Duration::hours(2)),
            sla_hours: 8.0,
            created_by: "usr-00000001".into(),
            created_at: now - Duration::hours(10),
            updated_at: now,
        }
    }

    #[test]
    fn corrective_may_have_past_schedule() {
        let now = Utc::now();
        assert!(corrective(now).validate(now).is_ok());
    }

    #[test]
    fn preventive_requires_schedule() {
        let now = Utc::now();
        let mut req = corrective(now);
        req.kind = RequestKind::Preventive;
        req.scheduled_at = None;
        let err = req.validate(now).unwrap_err();
        assert!(err.to_string().contains("must have a scheduled date"));
    }

    #[test]
    fn preventive_schedule_must_be_strictly_future() {
        let now = Utc::now();
        let mut req = corrective(now);
        req.kind = RequestKind::Preventive;
        req.scheduled_at = Some(now);
        assert!(matches!(req.validate(now), Err(CoreError::Validation(_))));

        req.scheduled_at = Some(now + Duration::days(2));
        assert!(req.validate(now).is_ok());
    }

    #[test]
    fn short_title_rejected_after_trim() {
        let now = Utc::now();
        let mut req = corrective(now);
        req.title = "  ab   ".into();
        let err = req.validate(now).unwrap_err();
        assert!(err.to_string().contains("Title must be at least 5"));
    }

    #[test]
    fn short_description_rejected() {
        let now = Utc::now();
        let mut req = corrective(now);
        req.description = "broken".into();
        assert!(req.validate(now).is_err());
    }

    #[test]
    fn sla_hours_must_be_positive() {
        let now = Utc::now();
        for bad in [0.0, -4.0, f64::NAN, f64::INFINITY] {
            let mut req = corrective(now);
            req.sla_hours = Some(bad);
            assert!(req.validate(now).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn empty_update_rejected() {
        let now = Utc::now();
        let err = RequestUpdate::default()
            .validate(RequestKind::Corrective, now)
            .unwrap_err();
        assert!(err.to_string().contains("No fields to update"));
    }

    #[test]
    fn update_follows_intake_rules() {
        let now = Utc::now();
        let short = RequestUpdate {
            title: Some(" ab ".into()),
            ..Default::default()
        };
        assert!(short.validate(RequestKind::Corrective, now).is_err());

        let bad_sla = RequestUpdate {
            sla_hours: Some(0.0),
            ..Default::default()
        };
        assert!(bad_sla.validate(RequestKind::Corrective, now).is_err());
    }

    #[test]
    fn preventive_keeps_a_future_schedule() {
        let now = Utc::now();
        let clear = RequestUpdate {
            clear_schedule: true,
            ..Default::default()
        };
        assert!(clear.validate(RequestKind::Corrective, now).is_ok());
        let err = clear.validate(RequestKind::Preventive, now).unwrap_err();
        assert!(err.to_string().contains("must have a scheduled date"));

        let past = RequestUpdate {
            scheduled_at: Some(now - Duration::hours(1)),
            ..Default::default()
        };
        assert!(past.validate(RequestKind::Preventive, now).is_err());
        assert!(past.validate(RequestKind::Corrective, now).is_ok());
    }

    #[test]
    fn apply_trims_and_touches_only_named_fields() {
        let now = Utc::now();
        let before = request(now - Duration::hours(1), RequestStatus::New);
        let edit = RequestUpdate {
            title: Some("  Hydraulic leak, bay 2  ".into()),
            priority: Some(Priority::Critical),
            clear_schedule: true,
            ..Default::default()
        };
        let after = edit.apply(&before, now);

        assert_eq!(after.title, "Hydraulic leak, bay 2");
        assert_eq!(after.priority, Priority::Critical);
        assert_eq!(after.scheduled_at, None);
        assert_eq!(after.description, before.description);
        assert_eq!(after.updated_at, now);
        assert_eq!(
            edit.changed_fields(),
            vec!["title", "priority", "scheduled_at"]
        );
    }

    #[test]
    fn terminal_request_is_never_overdue_and_has_no_sla() {
        let now = Utc::now();
        let open = request(now, RequestStatus::InProgress);
        assert!(open.is_overdue(now));
        assert!(open.sla(&SlaClock::default(), now).is_some_and(|v| v.breached));

        let done = request(now, RequestStatus::Repaired);
        assert!(!done.is_overdue(now));
        assert!(done.sla(&SlaClock::default(), now).is_none());
    }
}
