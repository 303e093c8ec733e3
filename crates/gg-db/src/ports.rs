//! Collaborator ports consumed by the lifecycle.
//!
//! The service only needs three facts from the outside world: who a user is,
//! whether a user is on a team, and somewhere to put audit events. Each is a
//! trait so deployments (and tests) can swap the source. [`SqlDirectory`]
//! answers the first two from the local `users` and `team_members` tables.

use std::sync::Arc;

use gg_core::entities::{AuditEvent, User};

use crate::GearDb;
use crate::repos::directory::select_user;

/// Resolves user ids to accounts (role, active flag, display data).
#[async_trait::async_trait]
pub trait IdentitySource: Send + Sync {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>>;
}

/// Answers "is this user currently on this team".
#[async_trait::async_trait]
pub trait TeamMembership: Send + Sync {
    async fn is_member(&self, user_id: &str, team_id: &str) -> anyhow::Result<bool>;
}

/// Destination for lifecycle audit events. Called off the request path by
/// the audit worker; failures are logged and dropped.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, event: &AuditEvent) -> anyhow::Result<()>;
}

/// Identity and membership backed by the local directory tables.
#[derive(Clone)]
pub struct SqlDirectory {
    db: Arc<GearDb>,
}

impl SqlDirectory {
    #[must_use]
    pub const fn new(db: Arc<GearDb>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl IdentitySource for SqlDirectory {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        Ok(select_user(self.db.conn(), user_id).await?)
    }
}

#[async_trait::async_trait]
impl TeamMembership for SqlDirectory {
    async fn is_member(&self, user_id: &str, team_id: &str) -> anyhow::Result<bool> {
        let mut rows = self
            .db
            .conn()
            .query(
                "SELECT 1 FROM team_members WHERE user_id = ?1 AND team_id = ?2",
                [user_id, team_id],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }
}
