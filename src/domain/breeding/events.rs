//! Reproductive events consumed by the KPI calculator

use crate::domain::identifiers::CattleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two event types that feed breeding KPIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreedingEventType {
    Insemination,
    Calving,
}

impl BreedingEventType {
    pub const ALL: [Self; 2] = [Self::Insemination, Self::Calving];

    /// Name used by the record store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insemination => "INSEMINATION",
            Self::Calving => "CALVING",
        }
    }
}

impl fmt::Display for BreedingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreedingEventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSEMINATION" => Ok(Self::Insemination),
            "CALVING" => Ok(Self::Calving),
            other => Err(UnknownEventType(other.to_owned())),
        }
    }
}

/// An event type outside the two the KPI core understands
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown breeding event type: {0}")]
pub struct UnknownEventType(pub String);

/// One insemination or calving of one animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub cattle_id: CattleId,
    pub event_type: BreedingEventType,
    pub event_datetime: DateTime<Utc>,
}

impl RawEvent {
    pub fn new(
        cattle_id: CattleId,
        event_type: BreedingEventType,
        event_datetime: DateTime<Utc>,
    ) -> Self {
        Self {
            cattle_id,
            event_type,
            event_datetime,
        }
    }

    pub fn insemination(cattle_id: CattleId, at: DateTime<Utc>) -> Self {
        Self::new(cattle_id, BreedingEventType::Insemination, at)
    }

    pub fn calving(cattle_id: CattleId, at: DateTime<Utc>) -> Self {
        Self::new(cattle_id, BreedingEventType::Calving, at)
    }
}
