//! Assignment reads and completion.

use chrono::Utc;
use tracing::info;

use gg_core::audit_detail::CompletedDetail;
use gg_core::entities::Assignment;
use gg_core::enums::{AuditAction, RequestStatus};

use super::abandon;
use crate::error::LifecycleError;
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

impl GearService {
    /// # Errors
    ///
    /// `NotFound` for an unknown assignment.
    pub async fn get_assignment(&self, id: &str) -> Result<Assignment, LifecycleError> {
        self.find_assignment(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Assignment", id))
    }

    /// The assignment for a request, or `None` while it is unassigned.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown request.
    pub async fn assignment_for_request(
        &self,
        request_id: &str,
    ) -> Result<Option<Assignment>, LifecycleError> {
        if self.find_request(request_id).await?.is_none() {
            return Err(LifecycleError::not_found("Maintenance request", request_id));
        }
        Ok(self.find_assignment_by_request_id(request_id).await?)
    }

    /// A technician's assignments, optionally limited to requests in `status`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown technician.
    pub async fn technician_assignments(
        &self,
        technician_id: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Assignment>, LifecycleError> {
        if self.lookup_user(technician_id).await?.is_none() {
            return Err(LifecycleError::not_found("Technician", technician_id));
        }
        Ok(self
            .find_assignments_by_technician(technician_id, status)
            .await?)
    }

    /// Record that the assigned work is finished.
    ///
    /// The request must already be out of `IN_PROGRESS`; completion fields
    /// are set once and never changed.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown assignment, `Validation` if it is already
    /// completed or its request is still `IN_PROGRESS`.
    pub async fn complete_assignment(
        &self,
        assignment_id: &str,
        notes: Option<&str>,
    ) -> Result<Assignment, LifecycleError> {
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        let uow = self.db().begin().await?;
        let completed = match self.complete_locked(&uow, assignment_id, notes).await {
            Ok(completed) => completed,
            Err(e) => {
                abandon(uow).await;
                return Err(e);
            }
        };
        uow.commit().await?;

        info!(assignment_id, request_id = %completed.request_id, "assignment completed");
        self.publish_audit(
            &completed.request_id,
            Some(&completed.assigned_to),
            AuditAction::AssignmentCompleted,
            &CompletedDetail {
                assignment_id: completed.id.clone(),
                notes: completed.notes.clone(),
            },
        );
        Ok(completed)
    }

    async fn complete_locked(
        &self,
        uow: &UnitOfWork,
        assignment_id: &str,
        notes: Option<&str>,
    ) -> Result<Assignment, LifecycleError> {
        let assignment = self
            .find_assignment_in(uow, assignment_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Assignment", assignment_id))?;
        if assignment.is_completed() {
            return Err(LifecycleError::Validation(
                "Assignment is already marked as completed".into(),
            ));
        }

        let request = self
            .find_request_for_update(uow, &assignment.request_id)
            .await?;
        if request.is_some_and(|r| r.status == RequestStatus::InProgress) {
            return Err(LifecycleError::Validation(
                "Cannot complete assignment while request status is IN_PROGRESS. \
                 Update request status to REPAIRED or SCRAP first."
                    .into(),
            ));
        }

        let now = Utc::now();
        self.mark_assignment_completed(uow, assignment_id, now, notes)
            .await?;
        Ok(Assignment {
            completed_at: Some(now),
            notes: notes.map(String::from),
            ..assignment
        })
    }
}
