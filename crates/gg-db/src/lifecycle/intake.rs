//! Request intake, edits, and read models.
//!
//! SLA position and overdue state are computed here on every read from the
//! stored row and the current time; neither is ever written back.

use chrono::{DateTime, Utc};
use tracing::info;

use gg_core::audit_detail::{CreatedDetail, UpdatedDetail};
use gg_core::entities::{MaintenanceRequest, NewRequest, RequestUpdate, RequestView};
use gg_core::enums::{AuditAction, EquipmentStatus, RequestStatus};
use gg_core::ids::PREFIX_REQUEST;
use gg_core::sla::SlaView;

use super::abandon;
use crate::error::LifecycleError;
use crate::repos::directory::select_equipment;
use crate::repos::request::RequestFilter;
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

impl GearService {
    /// Create a request in `NEW`, owned by the equipment's current team.
    ///
    /// # Errors
    ///
    /// - `Validation` for field rules (title, description, schedule, SLA) or
    ///   scrapped equipment
    /// - `NotFound` for unknown equipment or an unknown or inactive creator
    pub async fn create_request(
        &self,
        input: NewRequest,
    ) -> Result<MaintenanceRequest, LifecycleError> {
        let now = Utc::now();
        input.validate(now)?;

        match self.lookup_user(&input.created_by).await? {
            Some(user) if user.is_active => {}
            _ => return Err(LifecycleError::not_found("Active user", &input.created_by)),
        }

        let id = self.db().generate_id(PREFIX_REQUEST).await?;
        let uow = self.db().begin().await?;
        let request = match self.intake_locked(&uow, id, input, now).await {
            Ok(request) => request,
            Err(e) => {
                abandon(uow).await;
                return Err(e);
            }
        };
        uow.commit().await?;

        info!(
            request_id = %request.id,
            team_id = %request.team_id,
            kind = %request.kind,
            "maintenance request created"
        );
        self.publish_audit(
            &request.id,
            Some(&request.created_by),
            AuditAction::RequestCreated,
            &CreatedDetail {
                equipment_id: request.equipment_id.clone(),
                team_id: request.team_id.clone(),
                title: request.title.clone(),
            },
        );
        Ok(request)
    }

    /// Edit an open request's descriptive fields on behalf of `updated_by`.
    ///
    /// The edit is checked against the intake rules for the stored kind;
    /// status, team and equipment never change here.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty edit, a field rule, or a terminal request
    /// - `NotFound` for an unknown request or an unknown or inactive editor
    pub async fn update_request(
        &self,
        request_id: &str,
        update: &RequestUpdate,
        updated_by: &str,
    ) -> Result<MaintenanceRequest, LifecycleError> {
        if update.is_empty() {
            return Err(LifecycleError::Validation("No fields to update".into()));
        }
        match self.lookup_user(updated_by).await? {
            Some(user) if user.is_active => {}
            _ => return Err(LifecycleError::not_found("Active user", updated_by)),
        }

        let uow = self.db().begin().await?;
        let updated = match self.update_locked(&uow, request_id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                abandon(uow).await;
                return Err(e);
            }
        };
        uow.commit().await?;

        let fields = update.changed_fields();
        info!(request_id, ?fields, "maintenance request updated");
        self.publish_audit(
            request_id,
            Some(updated_by),
            AuditAction::RequestUpdated,
            &UpdatedDetail { fields },
        );
        Ok(updated)
    }

    async fn update_locked(
        &self,
        uow: &UnitOfWork,
        request_id: &str,
        update: &RequestUpdate,
    ) -> Result<MaintenanceRequest, LifecycleError> {
        let request = self
            .find_request_for_update(uow, request_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Maintenance request", request_id))?;
        if request.status.is_terminal() {
            return Err(LifecycleError::Validation(format!(
                "Cannot edit a request in terminal status {}",
                request.status
            )));
        }
        let now = Utc::now();
        update.validate(request.kind, now)?;

        let updated = update.apply(&request, now);
        self.update_request_fields(uow, &updated).await?;
        Ok(updated)
    }

    /// Read the equipment under the write lock so the team snapshot and the
    /// scrapped check see the same row the insert commits against.
    async fn intake_locked(
        &self,
        uow: &UnitOfWork,
        id: String,
        input: NewRequest,
        now: DateTime<Utc>,
    ) -> Result<MaintenanceRequest, LifecycleError> {
        let equipment = select_equipment(uow.conn(), &input.equipment_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Equipment", &input.equipment_id))?;
        if equipment.status == EquipmentStatus::Scrapped {
            return Err(LifecycleError::Validation(
                "Cannot create maintenance request for scrapped equipment".into(),
            ));
        }

        let request = MaintenanceRequest {
            id,
            equipment_id: equipment.id,
            team_id: equipment.team_id,
            kind: input.kind,
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            priority: input.priority.unwrap_or_default(),
            status: RequestStatus::New,
            scheduled_at: input.scheduled_at,
            sla_hours: input.sla_hours.unwrap_or_else(|| self.default_sla_hours()),
            created_by: input.created_by,
            created_at: now,
            updated_at: now,
        };
        self.insert_request(uow, &request).await?;
        Ok(request)
    }

    /// SLA position of `request` at `now` under the configured clock.
    #[must_use]
    pub fn sla_view(&self, request: &MaintenanceRequest, now: DateTime<Utc>) -> Option<SlaView> {
        request.sla(&self.clock(), now)
    }

    async fn view_at(
        &self,
        request: MaintenanceRequest,
        now: DateTime<Utc>,
    ) -> Result<RequestView, LifecycleError> {
        let assignment = self.find_assignment_by_request_id(&request.id).await?;
        Ok(RequestView {
            sla: self.sla_view(&request, now),
            is_overdue: request.is_overdue(now),
            assignment,
            request,
        })
    }

    /// One request with its assignment and derived state.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown request.
    pub async fn get_request(&self, id: &str) -> Result<RequestView, LifecycleError> {
        let request = self
            .find_request(id)
            .await?
            .ok_or_else(|| LifecycleError::not_found("Maintenance request", id))?;
        self.view_at(request, Utc::now()).await
    }

    /// Requests matching `filter`, newest first, with derived state.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    pub async fn list_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<RequestView>, LifecycleError> {
        let now = Utc::now();
        let requests = self.find_requests(filter).await?;
        let mut views = Vec::with_capacity(requests.len());
        for request in requests {
            views.push(self.view_at(request, now).await?);
        }
        Ok(views)
    }
}
