//! # gg-config
//!
//! Layered configuration loading for GearGuard using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`GEARGUARD_*` prefix, `__` as separator)
//! 2. Project-level `.gearguard/config.toml`
//! 3. User-level `~/.config/gearguard/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `GEARGUARD_DATABASE__PATH` -> `database.path`,
//! `GEARGUARD_SLA__DEFAULT_HOURS` -> `sla.default_hours`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use gg_config::GearConfig;
//!
//! let config = GearConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod audit;
mod database;
mod error;
mod general;
mod sla;

pub use audit::AuditConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use sla::SlaConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local directory holding the database and config file.
pub const PROJECT_DIR: &str = ".gearguard";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GearConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sla: SlaConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl GearConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("GEARGUARD_").split("__"))
    }

    /// Reject values the lifecycle cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sla = &self.sla;
        if !sla.default_hours.is_finite() || sla.default_hours <= 0.0 {
            return Err(ConfigError::invalid(
                "sla.default_hours",
                format!("must be a positive number, got {}", sla.default_hours),
            ));
        }
        if !(sla.at_risk_ratio > 0.0 && sla.at_risk_ratio <= 1.0) {
            return Err(ConfigError::invalid(
                "sla.at_risk_ratio",
                format!("must be in (0, 1], got {}", sla.at_risk_ratio),
            ));
        }
        if self.audit.queue_capacity == 0 {
            return Err(ConfigError::invalid("audit.queue_capacity", "must be at least 1"));
        }
        self.general.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gearguard").join("config.toml"))
    }
}
