//! Unit of work: one transaction holding the database write lock.
//!
//! A `UnitOfWork` owns a dedicated connection inside `BEGIN IMMEDIATE` and the
//! in-process writer gate. Everything done through [`UnitOfWork::conn`] is
//! either committed together or not at all.
//!
//! Dropping a unit of work without committing (including when the owning
//! future is cancelled) rolls the transaction back and only then releases
//! the gate, so the next writer never observes a half-finished transaction.

use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

use crate::error::{DatabaseError, classify};

pub struct UnitOfWork {
    conn: libsql::Connection,
    gate: Option<OwnedMutexGuard<()>>,
    finished: bool,
}

impl UnitOfWork {
    pub(crate) const fn new(conn: libsql::Connection, gate: OwnedMutexGuard<()>) -> Self {
        Self {
            conn,
            gate: Some(gate),
            finished: false,
        }
    }

    /// The transaction's connection.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Commit and release the write lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::UniqueViolation` if a constraint fails at
    /// commit, or `DatabaseError::LibSql` for other failures. On error the
    /// transaction is rolled back when `self` drops.
    pub async fn commit(mut self) -> Result<(), DatabaseError> {
        self.conn.execute("COMMIT", ()).await.map_err(classify)?;
        self.finished = true;
        debug!("unit of work committed");
        Ok(())
    }

    /// Roll back and release the write lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the ROLLBACK statement fails.
    pub async fn rollback(mut self) -> Result<(), DatabaseError> {
        self.finished = true;
        self.conn.execute("ROLLBACK", ()).await?;
        debug!("unit of work rolled back");
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let gate = self.gate.take();
        let conn = self.conn.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = conn.execute("ROLLBACK", ()).await {
                    warn!(error = %e, "rollback of abandoned unit of work failed");
                } else {
                    debug!("abandoned unit of work rolled back");
                }
                drop(gate);
            });
        } else {
            // Closing the last handle to the connection rolls back.
            warn!("unit of work dropped outside a runtime; relying on connection close");
        }
    }
}
