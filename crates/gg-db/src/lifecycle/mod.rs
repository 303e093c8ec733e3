//! Request lifecycle operations.
//!
//! - `assign`: the assignment coordinator
//! - `status`: manual status transitions
//! - `intake`: request creation, edits, and read models
//! - `completion`: assignment reads and completion

mod assign;
mod completion;
mod intake;
mod status;

use chrono::Utc;
use gg_core::entities::{AuditEvent, User};
use gg_core::enums::AuditAction;
use tracing::warn;

use crate::error::LifecycleError;
use crate::service::GearService;
use crate::unit_of_work::UnitOfWork;

impl GearService {
    /// Resolve a user through the identity port. `None` if unknown.
    pub(crate) async fn lookup_user(&self, user_id: &str) -> Result<Option<User>, LifecycleError> {
        self.identity()
            .find_user(user_id)
            .await
            .map_err(LifecycleError::Collaborator)
    }

    /// Hand an audit event to the publisher. Never fails the caller.
    pub(crate) fn publish_audit<T: serde::Serialize>(
        &self,
        request_id: &str,
        user_id: Option<&str>,
        action: AuditAction,
        detail: &T,
    ) {
        let details = match serde_json::to_value(detail) {
            Ok(details) => details,
            Err(e) => {
                warn!(request_id, %action, error = %e, "cannot serialize audit detail");
                serde_json::Value::Null
            }
        };
        self.audit().publish(AuditEvent {
            request_id: request_id.to_string(),
            user_id: user_id.map(String::from),
            action,
            details,
            occurred_at: Utc::now(),
        });
    }
}

/// Roll back after a failed check, keeping the original error.
pub(crate) async fn abandon(uow: UnitOfWork) {
    if let Err(e) = uow.rollback().await {
        warn!(error = %e, "rollback failed");
    }
}
