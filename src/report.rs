//! Report command: run one KPI query and render it as JSON.

use std::fs::File;
use std::io::BufReader;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{error, info, info_span, Instrument};

use breeding_kpi::application::{Application, BreedingKpiService, EventWindowLoader};
use breeding_kpi::config::Settings;
use breeding_kpi::domain::breeding::{KpiDomainError, TrendRequest};
use breeding_kpi::domain::identifiers::OwnerId;
use breeding_kpi::infrastructure::log_messages::application as messages;
use breeding_kpi::infrastructure::InMemoryEventLoader;

use crate::cli::Command;

/// Run `command` against the event file or the configured database.
pub async fn run(command: Command, settings: Settings) -> Result<String> {
    let span = info_span!("report");
    async move {
        info!("{}", messages::STARTING);
        let owner_id = OwnerId::try_new(command.source().owner).map_err(|_| {
            KpiDomainError::validation("owner id must be a positive integer", Some("owner"))
        })?;

        let value = match command.source().events.clone() {
            Some(path) => {
                info!(path = %path.display(), "{}", messages::USING_EVENT_FILE);
                let file = File::open(&path)
                    .with_context(|| format!("failed to open events file: {}", path.display()))?;
                let loader = InMemoryEventLoader::from_json_reader(BufReader::new(file))
                    .with_context(|| format!("failed to parse events file: {}", path.display()))?;
                let service = BreedingKpiService::new(loader, settings.kpi.to_options()?);
                execute(&service, owner_id, &command).await?
            }
            None => {
                let app = Application::from_settings(settings).await?;
                execute(app.service(), owner_id, &command).await?
            }
        };

        info!("{}", messages::REPORT_WRITTEN);
        Ok::<_, anyhow::Error>(serde_json::to_string_pretty(&value)?)
    }
    .instrument(span)
    .await
}

/// Dispatches to the matching service entry point. KPI failures are logged
/// with full details; the returned error carries tag and message only.
pub async fn execute<L: EventWindowLoader>(
    service: &BreedingKpiService<L>,
    owner_id: OwnerId,
    command: &Command,
) -> Result<Value> {
    let outcome = match command {
        Command::Metrics(args) => service
            .metrics(owner_id, args.from.as_deref(), args.to.as_deref())
            .await
            .map(serde_json::to_value),
        Command::Trends(args) => {
            let request = TrendRequest {
                to_month: args.to_month.clone(),
                from_month: args.from_month.clone(),
                months: args.months,
            };
            service
                .trends(owner_id, &request)
                .await
                .map(serde_json::to_value)
        }
        Command::Delta(args) => service
            .delta(owner_id, args.month.as_deref())
            .await
            .map(serde_json::to_value),
    };

    match outcome {
        Ok(value) => Ok(value?),
        Err(err) => {
            let details = serde_json::to_string(&err.details())?;
            error!(details = %details, "{}", err.kind());
            bail!(serde_json::to_string(&err.public())?)
        }
    }
}
