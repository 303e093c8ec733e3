//! Assignment coordinator.
//!
//! Binds one technician to one request and moves the request from `NEW` to
//! `IN_PROGRESS` in the same unit of work. Checks that need no lock run first
//! and fail fast; everything that depends on the request row is re-checked
//! under the write lock, so of two concurrent attempts on one request the
//! second always sees the first's committed assignment.

use chrono::Utc;
use tracing::{debug, info};

use gg_core::audit_detail::AssignedDetail;
use gg_core::entities::{Assignment, AssignmentReceipt, User};
use gg_core::enums::{AuditAction, RequestStatus, UserRole};
use gg_core::ids::PREFIX_ASSIGNMENT;
use gg_core::transition::validate_transition;

use super::abandon;
use crate::error::LifecycleError;
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

/// The UNIQUE column that holds one assignment per request.
const ASSIGNMENT_SLOT: &str = "request_assignments.request_id";

fn is_slot_taken(e: &LifecycleError) -> bool {
    matches!(e, LifecycleError::Database(db) if db.violates_unique(ASSIGNMENT_SLOT))
}

impl GearService {
    /// Assign technician `assigned_to` to `request_id` on behalf of
    /// `assigned_by`.
    ///
    /// Preconditions, in order: the assigner exists and is active; the
    /// technician exists, is active, and holds the technician role; the two
    /// differ; the request has no assignment; under the lock, the request is
    /// `NEW`; the technician is on the request's team.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown assigner, technician, or request
    /// - `Validation` for inactive users, self-assignment, or a request that
    ///   is not `NEW`
    /// - `Authorization` if the target is not a technician
    /// - `TeamMismatch` if the technician is not on the request's team
    /// - `Conflict` if the request is already assigned, including when a
    ///   concurrent assignment wins the race
    pub async fn assign_technician(
        &self,
        request_id: &str,
        assigned_to: &str,
        assigned_by: &str,
    ) -> Result<AssignmentReceipt, LifecycleError> {
        let assigner = self
            .lookup_user(assigned_by)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Assigner user", assigned_by))?;
        if !assigner.is_active {
            return Err(LifecycleError::Validation("Assigner user is inactive".into()));
        }

        let technician = self
            .lookup_user(assigned_to)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Technician", assigned_to))?;
        if !technician.is_active {
            return Err(LifecycleError::Validation(
                "Cannot assign to inactive technician".into(),
            ));
        }
        if technician.role != UserRole::Technician {
            return Err(LifecycleError::Authorization(
                "Can only assign requests to users with role \"technician\"".into(),
            ));
        }

        if assigned_to == assigned_by {
            return Err(LifecycleError::Validation(
                "Cannot self-assign requests. Assignment must be done by a manager.".into(),
            ));
        }

        if let Some(existing) = self.find_assignment_by_request_id(request_id).await? {
            return Err(self.already_assigned(&existing).await);
        }

        let uow = self.db().begin().await?;
        let assignment = match self
            .assign_locked(&uow, request_id, &technician, &assigner)
            .await
        {
            Ok(assignment) => assignment,
            Err(e) => {
                abandon(uow).await;
                return Err(self.race_lost_or(request_id, e).await);
            }
        };
        if let Err(e) = uow.commit().await {
            return Err(self.race_lost_or(request_id, e.into()).await);
        }

        info!(
            request_id,
            assignment_id = %assignment.id,
            assigned_to,
            assigned_by,
            "technician assigned"
        );

        let detail = AssignedDetail {
            assignment_id: assignment.id.clone(),
            assigned_to: technician.id.clone(),
            assigned_to_name: technician.name.clone(),
            assigned_by_name: assigner.name.clone(),
            previous_status: RequestStatus::New,
            new_status: RequestStatus::InProgress,
        };
        self.publish_audit(
            request_id,
            Some(assigned_by),
            AuditAction::RequestAssigned,
            &detail,
        );

        Ok(AssignmentReceipt {
            assignment,
            assigned_to_name: technician.name,
            assigned_to_email: technician.email,
            assigned_by_name: assigner.name,
            request_status: RequestStatus::InProgress,
        })
    }

    /// The check-then-write sequence, run while `uow` holds the write lock.
    async fn assign_locked(
        &self,
        uow: &UnitOfWork,
        request_id: &str,
        technician: &User,
        assigner: &User,
    ) -> Result<Assignment, LifecycleError> {
        let request = self
            .find_request_for_update(uow, request_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Maintenance request", request_id))?;
        debug!(request_id, status = %request.status, "request locked for assignment");

        if let Some(existing) = self.find_assignment_by_request_id_in(uow, request_id).await? {
            return Err(self.already_assigned(&existing).await);
        }

        if request.status != RequestStatus::New {
            return Err(LifecycleError::Validation(format!(
                "Cannot assign request with status \"{}\". Only NEW requests can be assigned.",
                request.status
            )));
        }

        let is_member = self
            .membership()
            .is_member(&technician.id, &request.team_id)
            .await
            .map_err(LifecycleError::Collaborator)?;
        if !is_member {
            return Err(LifecycleError::TeamMismatch {
                technician_id: technician.id.clone(),
                team_id: request.team_id,
            });
        }

        let now = Utc::now();
        let assignment = Assignment {
            id: self.db().generate_id(PREFIX_ASSIGNMENT).await?,
            request_id: request_id.to_string(),
            assigned_to: technician.id.clone(),
            assigned_by: assigner.id.clone(),
            assigned_at: now,
            completed_at: None,
            notes: None,
        };
        self.insert_assignment(uow, &assignment).await?;

        validate_transition(request.status, RequestStatus::InProgress)?;
        self.update_request_status(uow, request_id, RequestStatus::InProgress, now)
            .await?;

        Ok(assignment)
    }

    /// A UNIQUE violation on the assignment slot means another writer got
    /// there first; report it the same way the pre-check would. Any other
    /// failure, a generated-id collision included, passes through.
    async fn race_lost_or(&self, request_id: &str, e: LifecycleError) -> LifecycleError {
        if !is_slot_taken(&e) {
            return e;
        }
        match self.find_assignment_by_request_id(request_id).await {
            Ok(Some(existing)) => self.already_assigned(&existing).await,
            _ => LifecycleError::Conflict("Request is already assigned".into()),
        }
    }

    async fn already_assigned(&self, existing: &Assignment) -> LifecycleError {
        let name = match self.lookup_user(&existing.assigned_to).await {
            Ok(Some(user)) => user.name,
            _ => existing.assigned_to.clone(),
        };
        LifecycleError::Conflict(format!("Request is already assigned to {name}"))
    }
}
