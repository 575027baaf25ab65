//! Port through which the KPI service reads reproductive events

use crate::domain::breeding::{ExpandedWindow, KpiDomainError, RawEvent};
use crate::domain::identifiers::OwnerId;
use async_trait::async_trait;
use thiserror::Error;

/// Failures an event source can report
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed event row: {0}")]
    MalformedRow(String),

    #[error("Event source unavailable: {0}")]
    Unavailable(String),
}

impl From<LoaderError> for KpiDomainError {
    fn from(err: LoaderError) -> Self {
        let cause = err.to_string();
        KpiDomainError::infra("failed to load breeding events", Some(&cause))
    }
}

/// Source of insemination and calving events.
///
/// Implementations must return every `INSEMINATION` and `CALVING` event of
/// animals owned by `owner_id` whose datetime lies inside `window`, sorted
/// ascending by cattle id and then datetime. Events outside `window` may be
/// missed by the pairing logic near the reporting edges, so narrowing the
/// range is a correctness bug, not an optimization.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; trend requests issue one call per
/// month concurrently.
#[async_trait]
pub trait EventWindowLoader: Send + Sync {
    async fn find_events_for_breeding_kpi(
        &self,
        owner_id: OwnerId,
        window: ExpandedWindow,
    ) -> Result<Vec<RawEvent>, LoaderError>;
}

#[async_trait]
impl<L> EventWindowLoader for std::sync::Arc<L>
where
    L: EventWindowLoader + ?Sized,
{
    async fn find_events_for_breeding_kpi(
        &self,
        owner_id: OwnerId,
        window: ExpandedWindow,
    ) -> Result<Vec<RawEvent>, LoaderError> {
        (**self).find_events_for_breeding_kpi(owner_id, window).await
    }
}
