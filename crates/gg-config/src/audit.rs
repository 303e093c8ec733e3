//! Audit queue configuration.

use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

const fn default_queue_capacity() -> usize {
    1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Whether lifecycle events are written to the audit log at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Events buffered ahead of the audit worker. Events beyond this are
    /// dropped with a warning rather than blocking the caller.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            queue_capacity: default_queue_capacity(),
        }
    }
}
