//! Maintenance request repository.
//!
//! Plain reads go through the shared connection. `find_request_for_update`
//! and the writes take a [`UnitOfWork`] and run on its connection, under the
//! write lock it holds.

use chrono::{DateTime, Utc};

use gg_core::entities::MaintenanceRequest;
use gg_core::enums::{Priority, RequestKind, RequestStatus};

use crate::error::{DatabaseError, classify};
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

const SELECT_COLS: &str = "id, equipment_id, team_id, kind, title, description, priority, status, \
     scheduled_at, sla_hours, created_by, created_at, updated_at";

fn row_to_request(row: &libsql::Row) -> Result<MaintenanceRequest, DatabaseError> {
    Ok(MaintenanceRequest {
        id: row.get(0)?,
        equipment_id: row.get(1)?,
        team_id: row.get(2)?,
        kind: parse_enum(&row.get::<String>(3)?)?,
        title: row.get(4)?,
        description: row.get(5)?,
        priority: parse_enum(&row.get::<String>(6)?)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        scheduled_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        sla_hours: row.get::<f64>(9)?,
        created_by: row.get(10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

async fn select_by_id(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<MaintenanceRequest>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM maintenance_requests WHERE id = ?1"),
            [id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_request(&row)?)),
        None => Ok(None),
    }
}

/// Filter criteria for request listings.
#[derive(Debug, Default, Clone)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub kind: Option<RequestKind>,
    pub priority: Option<Priority>,
    pub team_id: Option<String>,
    pub equipment_id: Option<String>,
    pub limit: Option<u32>,
}

impl GearService {
    /// Committed state of one request.
    pub async fn find_request(&self, id: &str) -> Result<Option<MaintenanceRequest>, DatabaseError> {
        select_by_id(self.db().conn(), id).await
    }

    /// Read a request inside `uow`. The unit of work already holds the
    /// database write lock, so the row cannot change until it finishes.
    pub async fn find_request_for_update(
        &self,
        uow: &UnitOfWork,
        id: &str,
    ) -> Result<Option<MaintenanceRequest>, DatabaseError> {
        select_by_id(uow.conn(), id).await
    }

    pub(crate) async fn insert_request(
        &self,
        uow: &UnitOfWork,
        request: &MaintenanceRequest,
    ) -> Result<(), DatabaseError> {
        uow.conn()
            .execute(
                &format!(
                    "INSERT INTO maintenance_requests ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                libsql::params![
                    request.id.as_str(),
                    request.equipment_id.as_str(),
                    request.team_id.as_str(),
                    request.kind.as_str(),
                    request.title.as_str(),
                    request.description.as_str(),
                    request.priority.as_str(),
                    request.status.as_str(),
                    request.scheduled_at.map(|at| at.to_rfc3339()),
                    request.sla_hours,
                    request.created_by.as_str(),
                    request.created_at.to_rfc3339(),
                    request.updated_at.to_rfc3339()
                ],
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    /// Overwrite the stored status. Transition legality is the caller's job.
    pub async fn update_request_status(
        &self,
        uow: &UnitOfWork,
        id: &str,
        status: RequestStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let changed = uow
            .conn()
            .execute(
                "UPDATE maintenance_requests SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status.as_str(), at.to_rfc3339(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Overwrite the editable fields of a stored request.
    pub(crate) async fn update_request_fields(
        &self,
        uow: &UnitOfWork,
        request: &MaintenanceRequest,
    ) -> Result<(), DatabaseError> {
        let changed = uow
            .conn()
            .execute(
                "UPDATE maintenance_requests
                 SET title = ?1, description = ?2, priority = ?3, scheduled_at = ?4,
                     sla_hours = ?5, updated_at = ?6
                 WHERE id = ?7",
                libsql::params![
                    request.title.as_str(),
                    request.description.as_str(),
                    request.priority.as_str(),
                    request.scheduled_at.map(|at| at.to_rfc3339()),
                    request.sla_hours,
                    request.updated_at.to_rfc3339(),
                    request.id.as_str()
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Requests matching `filter`, newest first.
    pub async fn find_requests(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<MaintenanceRequest>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(status) = filter.status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
            conditions.push(format!("status = ?{}", params.len()));
        }
        if let Some(kind) = filter.kind {
            params.push(libsql::Value::Text(kind.as_str().to_string()));
            conditions.push(format!("kind = ?{}", params.len()));
        }
        if let Some(priority) = filter.priority {
            params.push(libsql::Value::Text(priority.as_str().to_string()));
            conditions.push(format!("priority = ?{}", params.len()));
        }
        if let Some(ref team_id) = filter.team_id {
            params.push(libsql::Value::Text(team_id.clone()));
            conditions.push(format!("team_id = ?{}", params.len()));
        }
        if let Some(ref equipment_id) = filter.equipment_id {
            params.push(libsql::Value::Text(equipment_id.clone()));
            conditions.push(format!("equipment_id = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or_else(|| self.default_limit());
        let sql = format!(
            "SELECT {SELECT_COLS} FROM maintenance_requests {where_clause}
             ORDER BY created_at DESC, id LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut requests = Vec::new();
        while let Some(row) = rows.next().await? {
            requests.push(row_to_request(&row)?);
        }
        Ok(requests)
    }
}
