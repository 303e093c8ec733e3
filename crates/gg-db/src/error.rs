//! Error types for gg-db.
//!
//! `DatabaseError` is the storage-level error. `LifecycleError` is what the
//! service hands back to callers; its [`ErrorKind`] is the coarse taxonomy an
//! outer layer maps onto response codes.

use gg_core::errors::CoreError;
use gg_core::transition::TransitionRejected;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A UNIQUE constraint rejected an insert or commit.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Whether this is a UNIQUE failure on `column`, written `table.column`
    /// the way `SQLite` names it in the message.
    #[must_use]
    pub fn violates_unique(&self, column: &str) -> bool {
        matches!(self, Self::UniqueViolation(msg) if msg.contains(column))
    }
}

/// Classify a raw libSQL error, pulling out UNIQUE constraint failures.
///
/// libSQL surfaces constraint failures as `SqliteFailure` with the SQLite
/// message text, so the check is on the message.
pub(crate) fn classify(e: libsql::Error) -> DatabaseError {
    let msg = e.to_string();
    if msg.contains("UNIQUE constraint failed") {
        DatabaseError::UniqueViolation(msg)
    } else {
        DatabaseError::LibSql(e)
    }
}

/// Coarse error classification for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

/// Errors returned by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Malformed input or a violated business rule.
    #[error("{0}")]
    Validation(String),

    /// Illegal status change; carries the allowed next states.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionRejected),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Already assigned, or a concurrent writer won the race.
    #[error("{0}")]
    Conflict(String),

    /// The acting or target user lacks the required role.
    #[error("{0}")]
    Authorization(String),

    #[error("Technician {technician_id} is not a member of the request's maintenance team {team_id}")]
    TeamMismatch {
        technician_id: String,
        team_id: String,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// An identity, membership, or other collaborator failed.
    #[error("Collaborator failed: {0}")]
    Collaborator(anyhow::Error),
}

impl LifecycleError {
    pub(crate) fn not_found(entity: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    /// Role and team-membership violations surface with the validation kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_)
            | Self::InvalidTransition(_)
            | Self::Authorization(_)
            | Self::TeamMismatch { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            // A UNIQUE failure nobody translated (an id collision) is ours.
            Self::Database(_) | Self::Collaborator(_) => ErrorKind::Internal,
        }
    }
}

impl From<CoreError> for LifecycleError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(msg) => Self::Validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use gg_core::enums::RequestStatus;
    use gg_core::transition::validate_transition;

    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let rejected = validate_transition(RequestStatus::InProgress, RequestStatus::New).unwrap_err();
        assert_eq!(LifecycleError::from(rejected).kind(), ErrorKind::Validation);
        assert_eq!(
            LifecycleError::not_found("Maintenance request", "req-1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LifecycleError::Conflict("taken".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            LifecycleError::Authorization("not a technician".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LifecycleError::TeamMismatch {
                technician_id: "usr-1".into(),
                team_id: "tem-1".into(),
            }
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LifecycleError::Database(DatabaseError::UniqueViolation("x".into())).kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            LifecycleError::Database(DatabaseError::NoResult).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn unique_violation_names_its_column() {
        let slot = DatabaseError::UniqueViolation(
            "SQLite failure: `UNIQUE constraint failed: request_assignments.request_id`".into(),
        );
        assert!(slot.violates_unique("request_assignments.request_id"));
        assert!(!slot.violates_unique("request_assignments.id"));

        let pk = DatabaseError::UniqueViolation(
            "SQLite failure: `UNIQUE constraint failed: request_assignments.id`".into(),
        );
        assert!(!pk.violates_unique("request_assignments.request_id"));
        assert!(!DatabaseError::NoResult.violates_unique("request_assignments.id"));
    }

    #[test]
    fn core_validation_keeps_message() {
        let err = LifecycleError::from(CoreError::Validation("Title must be at least 5 characters".into()));
        assert_eq!(err.to_string(), "Title must be at least 5 characters");
    }
}
