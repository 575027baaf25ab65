//! PostgreSQL-backed event loader
//!
//! Reads from the `cattle` and `events` tables. Only the two breeding event
//! types are selected, restricted to the owner's animals and the expanded
//! window, ordered by animal then time.

use crate::application::event_loader::{EventWindowLoader, LoaderError};
use crate::domain::breeding::{BreedingEventType, ExpandedWindow, RawEvent};
use crate::domain::identifiers::{CattleId, OwnerId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

const BREEDING_EVENTS_QUERY: &str = r#"
    SELECT e.cattle_id, e.event_type, e.event_datetime
    FROM events e
    JOIN cattle c ON c.cattle_id = e.cattle_id
    WHERE c.owner_id = $1
      AND e.event_type = ANY($2)
      AND e.event_datetime >= $3
      AND e.event_datetime <= $4
    ORDER BY e.cattle_id ASC, e.event_datetime ASC
"#;

/// [`EventWindowLoader`] over a Postgres pool
#[derive(Debug, Clone)]
pub struct PgEventWindowLoader {
    pool: PgPool,
}

impl PgEventWindowLoader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventWindowLoader for PgEventWindowLoader {
    #[instrument(skip(self, owner_id), fields(owner_id = %owner_id))]
    async fn find_events_for_breeding_kpi(
        &self,
        owner_id: OwnerId,
        window: ExpandedWindow,
    ) -> Result<Vec<RawEvent>, LoaderError> {
        let event_types: Vec<&str> = BreedingEventType::ALL
            .iter()
            .map(BreedingEventType::as_str)
            .collect();

        let rows = sqlx::query(BREEDING_EVENTS_QUERY)
            .bind(owner_id.into_inner())
            .bind(&event_types)
            .bind(window.from)
            .bind(window.to)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(event_from_row).collect()
    }
}

fn event_from_row(row: &PgRow) -> Result<RawEvent, LoaderError> {
    let raw_cattle_id: i64 = row.try_get("cattle_id")?;
    let raw_event_type: String = row.try_get("event_type")?;
    let event_datetime: DateTime<Utc> = row.try_get("event_datetime")?;

    let cattle_id = CattleId::try_new(raw_cattle_id)
        .map_err(|_| LoaderError::MalformedRow(format!("invalid cattle id {raw_cattle_id}")))?;
    let event_type = raw_event_type
        .parse::<BreedingEventType>()
        .map_err(|err| LoaderError::MalformedRow(err.to_string()))?;

    Ok(RawEvent::new(cattle_id, event_type, event_datetime))
}
