use std::path::PathBuf;

use anyhow::Context;
use gg_config::{GearConfig, PROJECT_DIR};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

/// Handle `gg init`: write `.gearguard/config.toml` with the defaults.
pub fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let dir = PathBuf::from(PROJECT_DIR);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let path = dir.join("config.toml");
    let written = if path.exists() && !args.force {
        tracing::info!(path = %path.display(), "config exists, leaving it in place");
        false
    } else {
        let body = toml::to_string_pretty(&GearConfig::default())
            .context("failed to serialize default config")?;
        std::fs::write(&path, body)
            .with_context(|| format!("failed to write {}", path.display()))?;
        true
    };

    output(
        &json!({ "config": path.display().to_string(), "written": written }),
        flags.format,
    )
}
