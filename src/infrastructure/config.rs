use crate::application::fleet_service::FanoutSettings;
use crate::domain::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub dashboard: DashboardSettings,
    pub fleet: FleetSettings,
    pub weather: WeatherSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub page_size: usize,
    /// Range token applied when a dashboard request names none.
    pub default_range: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FleetSettings {
    pub max_concurrency: usize,
    pub per_device_timeout_ms: u64,
    pub fail_fast: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreSettings {
    #[serde(default)]
    pub seed_file: Option<String>,
}

impl FleetSettings {
    pub fn fanout(&self) -> FanoutSettings {
        FanoutSettings {
            max_concurrency: self.max_concurrency.max(1),
            per_device_timeout: Duration::from_millis(self.per_device_timeout_ms),
            fail_fast: self.fail_fast,
        }
    }
}

fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.bind_addr", "0.0.0.0:8080")?
        .set_default("dashboard.page_size", DEFAULT_PAGE_SIZE as i64)?
        .set_default("dashboard.default_range", "1w")?
        .set_default("fleet.max_concurrency", 8)?
        .set_default("fleet.per_device_timeout_ms", 2000)?
        .set_default("fleet.fail_fast", false)?
        .set_default("weather.base_url", "https://api.openweathermap.org/data/2.5")?
        .set_default("weather.timeout_ms", 5000)?)
}

/// Load settings from `config/telemetry.*` (optional) and `TELEMETRY__*`
/// environment variables, e.g. `TELEMETRY__FLEET__MAX_CONCURRENCY=16`.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/telemetry").required(false))
        .add_source(config::Environment::with_prefix("TELEMETRY").separator("__"))
        .build()?;

    let mut app_config: AppConfig = settings.try_deserialize()?;
    if app_config.weather.api_key.is_none() {
        app_config.weather.api_key = std::env::var("OPENWEATHER_API_KEY").ok();
    }
    Ok(app_config)
}
