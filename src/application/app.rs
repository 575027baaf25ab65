use crate::application::{BreedingKpiService, KpiOptions};
use crate::config::Settings;
use crate::infrastructure::log_messages::application as messages;
use crate::infrastructure::{Database, PgEventWindowLoader};
use crate::Result;
use tracing::{info, instrument};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    database: Database,
    service: BreedingKpiService<PgEventWindowLoader>,
}

impl Application {
    #[instrument]
    pub async fn new() -> Result<Self> {
        let settings = Settings::new()?;
        Self::from_settings(settings).await
    }

    #[instrument(skip(settings))]
    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let options = settings.kpi.to_options()?;

        info!(host = %settings.database.host, "{}", messages::CONNECTING_TO_DATABASE);
        let database = Database::connect(
            &settings.database_url(),
            settings.database.max_connections,
        )
        .await?;

        let loader = PgEventWindowLoader::new(database.pool().clone());
        let service = BreedingKpiService::new(loader, options);

        Ok(Self {
            settings,
            database,
            service,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn service(&self) -> &BreedingKpiService<PgEventWindowLoader> {
        &self.service
    }

    pub fn kpi_options(&self) -> &KpiOptions {
        self.service.options()
    }
}
