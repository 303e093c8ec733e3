//! Service layer orchestrating lifecycle operations.
//!
//! `GearService` wraps `GearDb` (raw database access), the collaborator ports
//! (identity, team membership), and the audit publisher. Repo and lifecycle
//! methods are implemented as `impl GearService` blocks in `repos/` and
//! `lifecycle/`.
//!
//! Every lifecycle mutation follows this protocol:
//! 1. Fail-fast precondition checks that need no lock
//! 2. Begin a unit of work (write lock)
//! 3. Re-read and re-check under the lock, then write
//! 4. Commit
//! 5. Publish the audit event (best effort, after commit)

use std::path::Path;
use std::sync::Arc;

use gg_config::{GearConfig, SlaConfig};
use gg_core::sla::SlaClock;

use crate::GearDb;
use crate::audit::{AuditPublisher, SqlAuditSink};
use crate::error::DatabaseError;
use crate::ports::{AuditSink, IdentitySource, SqlDirectory, TeamMembership};

pub struct GearService {
    db: Arc<GearDb>,
    identity: Arc<dyn IdentitySource>,
    membership: Arc<dyn TeamMembership>,
    audit: AuditPublisher,
    sla: SlaConfig,
    default_limit: u32,
}

impl GearService {
    /// Open the configured database and wire the default collaborators.
    ///
    /// Must be called within a Tokio runtime (the audit worker is spawned on it).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database directory cannot be created,
    /// the database cannot be opened, or migrations fail.
    pub async fn open(config: &GearConfig) -> Result<Self, DatabaseError> {
        let path = Path::new(&config.database.path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Other(anyhow::anyhow!(
                    "cannot create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        let db = GearDb::open_local(&config.database.path, config.database.busy_timeout()).await?;
        Ok(Self::builder(Arc::new(db)).config(config).build())
    }

    /// Start building a service over an open database.
    #[must_use]
    pub fn builder(db: Arc<GearDb>) -> GearServiceBuilder {
        GearServiceBuilder {
            db,
            identity: None,
            membership: None,
            audit_sink: None,
            audit_enabled: true,
            audit_capacity: gg_config::AuditConfig::default().queue_capacity,
            sla: SlaConfig::default(),
            default_limit: gg_config::GeneralConfig::default().default_limit,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub fn db(&self) -> &GearDb {
        &self.db
    }

    pub(crate) fn identity(&self) -> &dyn IdentitySource {
        self.identity.as_ref()
    }

    pub(crate) fn membership(&self) -> &dyn TeamMembership {
        self.membership.as_ref()
    }

    pub(crate) const fn audit(&self) -> &AuditPublisher {
        &self.audit
    }

    /// The SLA clock configured for derived views.
    #[must_use]
    pub const fn clock(&self) -> SlaClock {
        self.sla.clock()
    }

    /// Budget applied to new requests that do not carry one.
    #[must_use]
    pub const fn default_sla_hours(&self) -> f64 {
        self.sla.default_hours
    }

    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Wait for queued audit events to reach the sink.
    pub async fn flush_audit(&self) {
        self.audit.flush().await;
    }
}

/// Builder for [`GearService`]. Unset collaborators default to the SQL
/// directory and SQL audit sink over the same database.
pub struct GearServiceBuilder {
    db: Arc<GearDb>,
    identity: Option<Arc<dyn IdentitySource>>,
    membership: Option<Arc<dyn TeamMembership>>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    audit_enabled: bool,
    audit_capacity: usize,
    sla: SlaConfig,
    default_limit: u32,
}

impl GearServiceBuilder {
    /// Take SLA, audit, and listing settings from `config`.
    #[must_use]
    pub fn config(mut self, config: &GearConfig) -> Self {
        self.sla = config.sla.clone();
        self.audit_enabled = config.audit.enabled;
        self.audit_capacity = config.audit.queue_capacity;
        self.default_limit = config.general.default_limit;
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: Arc<dyn IdentitySource>) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn membership(mut self, membership: Arc<dyn TeamMembership>) -> Self {
        self.membership = Some(membership);
        self
    }

    #[must_use]
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn audit_enabled(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }

    #[must_use]
    pub const fn sla(mut self, sla: SlaConfig) -> Self {
        self.sla = sla;
        self
    }

    /// Build the service. Must be called within a Tokio runtime when audit
    /// is enabled.
    #[must_use]
    pub fn build(self) -> GearService {
        let directory = SqlDirectory::new(Arc::clone(&self.db));
        let identity = self
            .identity
            .unwrap_or_else(|| Arc::new(directory.clone()));
        let membership = self.membership.unwrap_or_else(|| Arc::new(directory));

        let audit = if self.audit_enabled {
            let sink = self
                .audit_sink
                .unwrap_or_else(|| Arc::new(SqlAuditSink::new(Arc::clone(&self.db))));
            let (publisher, _worker) = AuditPublisher::spawn(sink, self.audit_capacity);
            publisher
        } else {
            AuditPublisher::disabled()
        };

        GearService {
            db: self.db,
            identity,
            membership,
            audit,
            sla: self.sla,
            default_limit: self.default_limit,
        }
    }
}
