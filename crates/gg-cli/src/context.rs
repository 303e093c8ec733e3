use anyhow::Context;
use gg_config::GearConfig;
use gg_db::GearService;

/// Loaded configuration and the opened lifecycle service.
pub struct AppContext {
    pub config: GearConfig,
    pub service: GearService,
}

impl AppContext {
    pub async fn init() -> anyhow::Result<Self> {
        let config = GearConfig::load_with_dotenv().context("failed to load configuration")?;
        let service = GearService::open(&config)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;
        Ok(Self { config, service })
    }
}
