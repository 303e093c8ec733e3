//! Manual status transitions.

use chrono::Utc;
use tracing::info;

use gg_core::audit_detail::StatusChangedDetail;
use gg_core::entities::MaintenanceRequest;
use gg_core::enums::{AuditAction, RequestStatus};
use gg_core::transition::validate_transition;

use super::abandon;
use crate::error::LifecycleError;
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

impl GearService {
    /// Move a request to `new_status` with no acting user recorded.
    ///
    /// # Errors
    ///
    /// See [`GearService::transition_status_by`].
    pub async fn transition_status(
        &self,
        request_id: &str,
        new_status: RequestStatus,
    ) -> Result<MaintenanceRequest, LifecycleError> {
        self.transition_status_by(request_id, new_status, None).await
    }

    /// Move a request to `new_status`, recording `actor` in the audit log.
    ///
    /// Requesting the current status is a no-op that returns the request
    /// unchanged and writes nothing.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown request, `InvalidTransition` (validation
    /// kind) for a change that is not an edge of the status graph.
    pub async fn transition_status_by(
        &self,
        request_id: &str,
        new_status: RequestStatus,
        actor: Option<&str>,
    ) -> Result<MaintenanceRequest, LifecycleError> {
        let uow = self.db().begin().await?;
        let (previous, updated) = match self.transition_locked(&uow, request_id, new_status).await {
            Ok(result) => result,
            Err(e) => {
                abandon(uow).await;
                return Err(e);
            }
        };
        if previous == new_status {
            abandon(uow).await;
            return Ok(updated);
        }
        uow.commit().await?;

        info!(request_id, from = %previous, to = %new_status, "request status changed");
        self.publish_audit(
            request_id,
            actor,
            AuditAction::StatusChanged,
            &StatusChangedDetail {
                from: previous,
                to: new_status,
            },
        );
        Ok(updated)
    }

    async fn transition_locked(
        &self,
        uow: &UnitOfWork,
        request_id: &str,
        new_status: RequestStatus,
    ) -> Result<(RequestStatus, MaintenanceRequest), LifecycleError> {
        let current = self
            .find_request_for_update(uow, request_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Maintenance request", request_id))?;
        validate_transition(current.status, new_status)?;
        if current.status == new_status {
            return Ok((current.status, current));
        }

        let now = Utc::now();
        self.update_request_status(uow, request_id, new_status, now)
            .await?;
        let previous = current.status;
        Ok((
            previous,
            MaintenanceRequest {
                status: new_status,
                updated_at: now,
                ..current
            },
        ))
    }
}
