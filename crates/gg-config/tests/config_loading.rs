//! Integration tests for layered configuration loading.
//!
//! Uses `figment::Jail` for sandboxed working directory and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use gg_config::GearConfig;
use pretty_assertions::assert_eq;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/gearguard/main.db"
busy_timeout_ms = 250

[sla]
default_hours = 24.0
at_risk_ratio = 0.75

[audit]
enabled = false
queue_capacity = 16
"#,
        )?;

        let config: GearConfig = Figment::from(Serialized::defaults(GearConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/gearguard/main.db");
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert!((config.sla.default_hours - 24.0).abs() < f64::EPSILON);
        assert!((config.sla.at_risk_ratio - 0.75).abs() < f64::EPSILON);
        assert!(!config.audit.enabled);
        assert_eq!(config.audit.queue_capacity, 16);
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[sla]\ndefault_hours = 12.0\n")?;

        let config: GearConfig = Figment::from(Serialized::defaults(GearConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!((config.sla.default_hours - 12.0).abs() < f64::EPSILON);
        assert!((config.sla.at_risk_ratio - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.database.path, ".gearguard/gearguard.db");
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".gearguard"))
            .map_err(|e| e.to_string())?;
        jail.create_file(
            ".gearguard/config.toml",
            "[general]\ndefault_limit = 5\n",
        )?;

        let config = GearConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.general.default_limit, 5);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".gearguard"))
            .map_err(|e| e.to_string())?;
        jail.create_file(
            ".gearguard/config.toml",
            "[database]\npath = \"from-toml.db\"\n",
        )?;
        jail.set_env("GEARGUARD_DATABASE__PATH", "from-env.db");
        jail.set_env("GEARGUARD_SLA__DEFAULT_HOURS", "72");

        let config = GearConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.database.path, "from-env.db");
        assert!((config.sla.default_hours - 72.0).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn invalid_env_value_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("GEARGUARD_SLA__AT_RISK_RATIO", "2.5");
        let result = GearConfig::load();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("sla.at_risk_ratio"));
        Ok(())
    });
}
