//! Settings that are not tied to one subsystem.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_LIST_LIMIT: u32 = 20;

const fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Rows returned by `request list` when no `--limit` is given.
    #[serde(default = "default_list_limit")]
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl GeneralConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::invalid("general.default_limit", "must be at least 1"));
        }
        Ok(())
    }
}
