use std::sync::Arc;

use gg_core::entities::AuditEvent;

use crate::GearDb;
use crate::ports::AuditSink;

/// Audit sink writing to the local `audit_log` table.
#[derive(Clone)]
pub struct SqlAuditSink {
    db: Arc<GearDb>,
}

impl SqlAuditSink {
    #[must_use]
    pub const fn new(db: Arc<GearDb>) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl AuditSink for SqlAuditSink {
    async fn append(&self, event: &AuditEvent) -> anyhow::Result<()> {
        self.db.append_audit(event).await?;
        Ok(())
    }
}
