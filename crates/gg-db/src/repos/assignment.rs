//! Assignment repository.
//!
//! At most one row per request, enforced by `uq_assignment_request`. Rows are
//! inserted once by the assignment coordinator and later only annotated with
//! completion data; nothing deletes them.

use chrono::{DateTime, Utc};

use gg_core::entities::Assignment;
use gg_core::enums::RequestStatus;

use crate::error::{DatabaseError, classify};
use crate::helpers::{get_opt_string, parse_datetime, parse_optional_datetime};
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

const SELECT_COLS: &str = "id, request_id, assigned_to, assigned_by, assigned_at, completed_at, notes";

fn row_to_assignment(row: &libsql::Row) -> Result<Assignment, DatabaseError> {
    Ok(Assignment {
        id: row.get(0)?,
        request_id: row.get(1)?,
        assigned_to: row.get(2)?,
        assigned_by: row.get(3)?,
        assigned_at: parse_datetime(&row.get::<String>(4)?)?,
        completed_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        notes: get_opt_string(row, 6)?,
    })
}

async fn select_one(
    conn: &libsql::Connection,
    column: &str,
    value: &str,
) -> Result<Option<Assignment>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM request_assignments WHERE {column} = ?1"),
            [value],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_assignment(&row)?)),
        None => Ok(None),
    }
}

impl GearService {
    pub async fn find_assignment(&self, id: &str) -> Result<Option<Assignment>, DatabaseError> {
        select_one(self.db().conn(), "id", id).await
    }

    /// Committed assignment for a request, if any.
    pub async fn find_assignment_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<Assignment>, DatabaseError> {
        select_one(self.db().conn(), "request_id", request_id).await
    }

    pub(crate) async fn find_assignment_in(
        &self,
        uow: &UnitOfWork,
        id: &str,
    ) -> Result<Option<Assignment>, DatabaseError> {
        select_one(uow.conn(), "id", id).await
    }

    /// Assignment for a request as seen inside `uow`, under the write lock.
    pub(crate) async fn find_assignment_by_request_id_in(
        &self,
        uow: &UnitOfWork,
        request_id: &str,
    ) -> Result<Option<Assignment>, DatabaseError> {
        select_one(uow.conn(), "request_id", request_id).await
    }

    /// Insert a new assignment.
    ///
    /// A second assignment for the same request fails with
    /// `DatabaseError::UniqueViolation`.
    pub(crate) async fn insert_assignment(
        &self,
        uow: &UnitOfWork,
        assignment: &Assignment,
    ) -> Result<(), DatabaseError> {
        uow.conn()
            .execute(
                &format!(
                    "INSERT INTO request_assignments ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                libsql::params![
                    assignment.id.as_str(),
                    assignment.request_id.as_str(),
                    assignment.assigned_to.as_str(),
                    assignment.assigned_by.as_str(),
                    assignment.assigned_at.to_rfc3339(),
                    assignment.completed_at.map(|at| at.to_rfc3339()),
                    assignment.notes.as_deref()
                ],
            )
            .await
            .map_err(classify)?;
        Ok(())
    }

    /// Set the completion fields. Only touches rows not yet completed.
    pub(crate) async fn mark_assignment_completed(
        &self,
        uow: &UnitOfWork,
        id: &str,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let changed = uow
            .conn()
            .execute(
                "UPDATE request_assignments SET completed_at = ?1, notes = ?2
                 WHERE id = ?3 AND completed_at IS NULL",
                libsql::params![at.to_rfc3339(), notes, id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Assignments held by a technician, optionally narrowed to requests in
    /// one status. Scheduled work comes first, soonest first.
    pub async fn find_assignments_by_technician(
        &self,
        technician_id: &str,
        status: Option<RequestStatus>,
    ) -> Result<Vec<Assignment>, DatabaseError> {
        let cols = SELECT_COLS
            .split(", ")
            .map(|c| format!("ra.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let status_clause = if status.is_some() {
            "AND mr.status = ?2"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {cols} FROM request_assignments ra
             JOIN maintenance_requests mr ON mr.id = ra.request_id
             WHERE ra.assigned_to = ?1 {status_clause}
             ORDER BY mr.scheduled_at ASC NULLS LAST, mr.created_at DESC"
        );

        let mut params = vec![libsql::Value::Text(technician_id.to_string())];
        if let Some(status) = status {
            params.push(libsql::Value::Text(status.as_str().to_string()));
        }

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next().await? {
            assignments.push(row_to_assignment(&row)?);
        }
        Ok(assignments)
    }
}
