//! # gg-db
//!
//! libSQL storage and the request lifecycle service for GearGuard.
//!
//! Holds the relational state (users, teams, equipment, requests,
//! assignments, audit log), the unit-of-work locking protocol, the
//! collaborator ports the lifecycle consumes, and `GearService`, which
//! implements the lifecycle operations on top of them.
//!
//! The database must be file-backed: every unit of work opens its own
//! connection, and separate connections to `:memory:` see separate databases.

pub mod audit;
pub mod error;
pub mod helpers;
pub mod lifecycle;
mod migrations;
pub mod ports;
pub mod repos;
pub mod service;
pub mod unit_of_work;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::Mutex;
use tracing::debug;

pub use error::{ErrorKind, LifecycleError};
pub use service::GearService;
pub use unit_of_work::UnitOfWork;

/// Central database handle.
///
/// Reads go through one shared autocommit connection. Writes go through
/// [`GearDb::begin`], which serialises writers in-process on an async gate and
/// across processes with `BEGIN IMMEDIATE`.
pub struct GearDb {
    db: libsql::Database,
    conn: libsql::Connection,
    write_gate: Arc<Mutex<()>>,
    busy_timeout: Duration,
}

impl GearDb {
    /// Open a local database file, creating it if needed.
    ///
    /// Enables WAL, sets the busy timeout, and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        configure_connection(&conn, busy_timeout).await?;
        pragma(&conn, "PRAGMA journal_mode = WAL")
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;

        let gear_db = Self {
            db,
            conn,
            write_gate: Arc::new(Mutex::new(())),
            busy_timeout,
        };
        gear_db.run_migrations().await?;
        debug!(path, "database opened");
        Ok(gear_db)
    }

    /// The shared autocommit connection, for reads.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Start a unit of work holding the database write lock.
    ///
    /// Waits on the in-process writer gate first, then opens a dedicated
    /// connection and runs `BEGIN IMMEDIATE`. The lock is held until the
    /// unit of work is committed, rolled back, or dropped.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be opened or another
    /// process holds the write lock past the busy timeout.
    pub async fn begin(&self) -> Result<UnitOfWork, DatabaseError> {
        let guard = Arc::clone(&self.write_gate).lock_owned().await;
        let conn = self.db.connect()?;
        configure_connection(&conn, self.busy_timeout).await?;
        conn.execute("BEGIN IMMEDIATE", ()).await?;
        debug!("write lock acquired");
        Ok(UnitOfWork::new(conn, guard))
    }

    /// Run a single write statement in its own unit of work.
    ///
    /// Returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UniqueViolation` on a UNIQUE constraint
    /// failure, or another `DatabaseError` if the statement or commit fails.
    pub async fn execute_write(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<u64, DatabaseError> {
        let uow = self.begin().await?;
        let changed = uow.conn().execute(sql, params).await.map_err(error::classify)?;
        uow.commit().await?;
        Ok(changed)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g. `"req-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

/// Per-connection settings. `SQLite` does not persist these in the file.
async fn configure_connection(
    conn: &libsql::Connection,
    busy_timeout: Duration,
) -> Result<(), DatabaseError> {
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
    pragma(
        conn,
        &format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis()),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
    Ok(())
}

/// Run a PRAGMA that reports its new value as a row.
async fn pragma(conn: &libsql::Connection, sql: &str) -> Result<(), libsql::Error> {
    let mut rows = conn.query(sql, ()).await?;
    while rows.next().await?.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::test_support::helpers::test_db;

    #[tokio::test]
    async fn open_local_creates_schema() {
        let (_dir, db) = test_db().await;
        let tables = [
            "users",
            "teams",
            "team_members",
            "equipment",
            "maintenance_requests",
            "request_assignments",
            "audit_log",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            assert!(rows.next().await.unwrap().is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gear.db");
        let path = path.to_str().unwrap();
        drop(GearDb::open_local(path, Duration::from_secs(1)).await.unwrap());
        GearDb::open_local(path, Duration::from_secs(1)).await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let (_dir, db) = test_db().await;
        let id = db.generate_id("req").await.unwrap();
        assert!(id.starts_with("req-"), "{id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_unique() {
        let (_dir, db) = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            assert!(ids.insert(db.generate_id("asg").await.unwrap()));
        }
    }

    #[tokio::test]
    async fn foreign_keys_enforced_in_unit_of_work() {
        let (_dir, db) = test_db().await;
        let uow = db.begin().await.unwrap();
        let result = uow
            .conn()
            .execute(
                "INSERT INTO team_members (team_id, user_id, joined_at) VALUES ('tem-x', 'usr-x', '2026-01-01T00:00:00Z')",
                (),
            )
            .await;
        assert!(result.is_err(), "orphan membership should be rejected");
        uow.rollback().await.unwrap();
    }
}
