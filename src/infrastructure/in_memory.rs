//! In-memory event loader for tests and offline runs

use crate::application::event_loader::{EventWindowLoader, LoaderError};
use crate::domain::breeding::{ExpandedWindow, RawEvent};
use crate::domain::identifiers::OwnerId;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// An event tagged with the owner of its animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedEvent {
    pub owner_id: OwnerId,
    #[serde(flatten)]
    pub event: RawEvent,
}

/// Holds every owner's events and answers loader calls from memory.
///
/// Records each requested window so callers can check what was asked for.
#[derive(Debug, Default)]
pub struct InMemoryEventLoader {
    events: Vec<OwnedEvent>,
    requests: Mutex<Vec<(OwnerId, ExpandedWindow)>>,
}

impl InMemoryEventLoader {
    pub fn new(events: impl IntoIterator<Item = OwnedEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Loads a JSON array of [`OwnedEvent`]s
    pub fn from_json_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        let events: Vec<OwnedEvent> = serde_json::from_reader(reader)?;
        Ok(Self::new(events))
    }

    pub fn for_owner(owner_id: OwnerId, events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self::new(
            events
                .into_iter()
                .map(|event| OwnedEvent { owner_id, event }),
        )
    }

    pub fn requests(&self) -> Vec<(OwnerId, ExpandedWindow)> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl EventWindowLoader for InMemoryEventLoader {
    async fn find_events_for_breeding_kpi(
        &self,
        owner_id: OwnerId,
        window: ExpandedWindow,
    ) -> Result<Vec<RawEvent>, LoaderError> {
        self.requests.lock().push((owner_id, window));

        let mut events: Vec<RawEvent> = self
            .events
            .iter()
            .filter(|owned| owned.owner_id == owner_id)
            .map(|owned| owned.event)
            .filter(|event| window.contains(event.event_datetime))
            .collect();
        events.sort_by_key(|event| (event.cattle_id, event.event_datetime));
        Ok(events)
    }
}
