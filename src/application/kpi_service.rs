//! Breeding KPI entry points
//!
//! Validates caller input, fetches events through the [`EventWindowLoader`]
//! port and hands them to the pure calculator. Nothing here is persisted.

use crate::application::event_loader::EventWindowLoader;
use crate::domain::breeding::{
    build_trend, BreedingMetricsCalculator, BreedingRules, DeltaSummary, KpiDomainError,
    KpiResult, MetricsReport, RawEvent, ReportingWindow, TrendLimits, TrendReport, TrendRequest,
    WindowExpansion, DEFAULT_WINDOW_DAYS, DELTA_MONTHS,
};
use crate::domain::identifiers::OwnerId;
use crate::infrastructure::log_messages::kpi as messages;
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Source of "now" for default windows and months
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Tunables for [`BreedingKpiService`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiOptions {
    pub rules: BreedingRules,
    pub expansion: WindowExpansion,
    pub limits: TrendLimits,
    pub default_window_days: i64,
}

impl Default for KpiOptions {
    fn default() -> Self {
        Self {
            rules: BreedingRules::default(),
            expansion: WindowExpansion::default(),
            limits: TrendLimits::default(),
            default_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

/// Computes breeding KPIs for one owner at a time
pub struct BreedingKpiService<L> {
    loader: L,
    calculator: BreedingMetricsCalculator,
    options: KpiOptions,
    clock: Arc<dyn Clock>,
}

impl<L: EventWindowLoader> BreedingKpiService<L> {
    pub fn new(loader: L, options: KpiOptions) -> Self {
        Self {
            loader,
            calculator: BreedingMetricsCalculator::new(options.rules),
            options,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn options(&self) -> &KpiOptions {
        &self.options
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Metrics for `[from, to]`, defaulting to the trailing year.
    ///
    /// Bounds are ISO-8601 strings and are validated before any fetch.
    #[instrument(skip(self))]
    pub async fn metrics(
        &self,
        owner_id: OwnerId,
        from: Option<&str>,
        to: Option<&str>,
    ) -> KpiResult<MetricsReport> {
        let window = ReportingWindow::resolve(
            from,
            to,
            self.clock.now(),
            self.options.default_window_days,
        )?;
        self.metrics_for_window(owner_id, window).await
    }

    /// Metrics for an already-validated window
    pub async fn metrics_for_window(
        &self,
        owner_id: OwnerId,
        window: ReportingWindow,
    ) -> KpiResult<MetricsReport> {
        let events = self.load(owner_id, &window).await?;
        self.calculator.compute(owner_id, &window, &events)
    }

    /// Monthly series and deltas. Each month gets its own loader call,
    /// issued concurrently.
    #[instrument(skip(self))]
    pub async fn trends(
        &self,
        owner_id: OwnerId,
        request: &TrendRequest,
    ) -> KpiResult<TrendReport> {
        let months = request.resolve(self.clock.now(), &self.options.limits)?;
        debug!(months = months.len(), "{}", messages::RESOLVED_TREND_MONTHS);

        let fetches = months.iter().map(|month| async move {
            let events = self.load(owner_id, &month.window()).await?;
            Ok::<_, KpiDomainError>((*month, events))
        });
        let batches = try_join_all(fetches).await?;

        build_trend(&self.calculator, owner_id, batches)
    }

    /// Change between `month` (default: current month) and the month before
    #[instrument(skip(self))]
    pub async fn delta(&self, owner_id: OwnerId, month: Option<&str>) -> KpiResult<DeltaSummary> {
        let request = TrendRequest {
            to_month: month.map(str::to_owned),
            from_month: None,
            months: Some(i64::from(DELTA_MONTHS)),
        };
        let report = self.trends(owner_id, &request).await?;
        Ok(DeltaSummary::latest(&report.deltas))
    }

    async fn load(&self, owner_id: OwnerId, window: &ReportingWindow) -> KpiResult<Vec<RawEvent>> {
        let expanded = window.expand(&self.options.expansion)?;
        match self
            .loader
            .find_events_for_breeding_kpi(owner_id, expanded)
            .await
        {
            Ok(events) => {
                debug!(
                    owner_id = %owner_id,
                    events = events.len(),
                    "{}",
                    messages::EVENTS_LOADED
                );
                Ok(events)
            }
            Err(err) => {
                warn!(owner_id = %owner_id, error = %err, "{}", messages::LOAD_FAILED);
                Err(err.into())
            }
        }
    }
}
