//! SLA budget defaults.

use gg_core::sla::{DEFAULT_AT_RISK_RATIO, DEFAULT_SLA_HOURS, SlaClock};
use serde::{Deserialize, Serialize};

const fn default_hours() -> f64 {
    DEFAULT_SLA_HOURS
}

const fn default_at_risk_ratio() -> f64 {
    DEFAULT_AT_RISK_RATIO
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlaConfig {
    /// Budget applied to requests created without an explicit one.
    #[serde(default = "default_hours")]
    pub default_hours: f64,

    /// Fraction of the budget after which an open request is shown as at risk.
    #[serde(default = "default_at_risk_ratio")]
    pub at_risk_ratio: f64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            default_hours: default_hours(),
            at_risk_ratio: default_at_risk_ratio(),
        }
    }
}

impl SlaConfig {
    #[must_use]
    pub const fn clock(&self) -> SlaClock {
        SlaClock::new(self.at_risk_ratio)
    }
}
