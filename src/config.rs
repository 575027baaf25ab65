use crate::application::KpiOptions;
use crate::domain::breeding::window::validate_span_days;
use crate::domain::breeding::{
    BreedingRules, GestationWindow, KpiResult, TrendLimits, WindowExpansion,
};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub kpi: KpiSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database_name: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct KpiSettings {
    pub gestation_min_days: f64,
    pub gestation_max_days: f64,
    pub lookback_days: i64,
    pub lookahead_days: i64,
    pub default_window_days: i64,
    pub default_trend_months: u32,
    pub max_trend_months: u32,
}

impl KpiSettings {
    /// Validates the settings into service options
    pub fn to_options(&self) -> KpiResult<KpiOptions> {
        Ok(KpiOptions {
            rules: BreedingRules {
                gestation: GestationWindow::new(self.gestation_min_days, self.gestation_max_days)?,
            },
            expansion: WindowExpansion::new(self.lookback_days, self.lookahead_days)?,
            limits: TrendLimits::new(self.default_trend_months, self.max_trend_months)?,
            default_window_days: validate_span_days(
                self.default_window_days,
                "default_window_days",
            )?,
        })
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.username", "postgres")?
            .set_default("database.password", "password")?
            .set_default("database.database_name", "breeding_kpi")?
            .set_default("database.max_connections", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("kpi.gestation_min_days", GestationWindow::DEFAULT_MIN_DAYS)?
            .set_default("kpi.gestation_max_days", GestationWindow::DEFAULT_MAX_DAYS)?
            .set_default("kpi.lookback_days", WindowExpansion::DEFAULT_LOOKBACK_DAYS)?
            .set_default("kpi.lookahead_days", WindowExpansion::DEFAULT_LOOKAHEAD_DAYS)?
            .set_default("kpi.default_window_days", 365)?
            .set_default("kpi.default_trend_months", 2)?
            .set_default("kpi.max_trend_months", 60)?
            // Add configuration file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix
            .add_source(Environment::with_prefix("BREEDING_KPI").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.database.username,
            self.database.password,
            self.database.host,
            self.database.port,
            self.database.database_name
        )
    }
}
