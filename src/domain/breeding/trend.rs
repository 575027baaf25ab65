//! Monthly trend series of breeding metrics
//!
//! A trend is the calculator run once per calendar month. Resolving which
//! months to cover happens up front so malformed requests fail before any
//! events are fetched.

use super::calculator::BreedingMetricsCalculator;
use super::delta::{delta, DeltaPoint};
use super::errors::{KpiDomainError, KpiResult};
use super::events::RawEvent;
use super::metrics::{BreedingMetrics, Counts};
use super::month::YearMonth;
use crate::domain::identifiers::OwnerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TREND_MONTHS: u32 = 2;
pub const MAX_TREND_MONTHS: u32 = 60;

/// Months compared by the delta entry point: the target month and the one before
pub const DELTA_MONTHS: u32 = 2;

/// Bounds on how many months one trend request may cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendLimits {
    pub default_months: u32,
    pub max_months: u32,
}

impl TrendLimits {
    pub fn new(default_months: u32, max_months: u32) -> KpiResult<Self> {
        if default_months == 0 {
            return Err(KpiDomainError::validation(
                "default trend length must be at least one month",
                Some("default_trend_months"),
            ));
        }
        if max_months < DELTA_MONTHS {
            return Err(KpiDomainError::validation(
                format!("maximum trend length must be at least {DELTA_MONTHS} months"),
                Some("max_trend_months"),
            ));
        }
        if default_months > max_months {
            return Err(KpiDomainError::validation(
                "default trend length exceeds the maximum",
                Some("max_trend_months"),
            ));
        }
        Ok(Self {
            default_months,
            max_months,
        })
    }
}

impl Default for TrendLimits {
    fn default() -> Self {
        Self {
            default_months: DEFAULT_TREND_MONTHS,
            max_months: MAX_TREND_MONTHS,
        }
    }
}

/// Caller's trend parameters as received
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRequest {
    pub to_month: Option<String>,
    pub from_month: Option<String>,
    pub months: Option<i64>,
}

impl TrendRequest {
    /// Months ending at `month` (or the current month) with the default length
    pub fn ending_at(month: Option<&str>) -> Self {
        Self {
            to_month: month.map(str::to_owned),
            ..Self::default()
        }
    }

    /// The months to report, oldest first.
    ///
    /// `from_month` wins over `months` when both are given.
    pub fn resolve(&self, now: DateTime<Utc>, limits: &TrendLimits) -> KpiResult<Vec<YearMonth>> {
        let to = match self.to_month.as_deref() {
            Some(raw) => raw.parse::<YearMonth>()?,
            None => YearMonth::containing(now),
        };

        let from = match self.from_month.as_deref() {
            Some(raw) => {
                let from = raw.parse::<YearMonth>()?;
                if from > to {
                    return Err(KpiDomainError::period(
                        "fromMonth is after toMonth",
                        Some(&format!("{from}..{to}")),
                    ));
                }
                from
            }
            None => {
                let months = self.months.unwrap_or(i64::from(limits.default_months));
                if months < 1 {
                    return Err(KpiDomainError::validation(
                        "months must be at least 1",
                        Some("months"),
                    ));
                }
                let months = u32::try_from(months).map_err(|_| too_many(limits))?;
                if months > limits.max_months {
                    return Err(too_many(limits));
                }
                to.minus_months(months - 1)
            }
        };

        if YearMonth::months_between_inclusive(from, to) > i64::from(limits.max_months) {
            return Err(too_many(limits));
        }
        Ok(YearMonth::span(from, to))
    }
}

fn too_many(limits: &TrendLimits) -> KpiDomainError {
    KpiDomainError::validation(
        format!("a trend may cover at most {} months", limits.max_months),
        Some("months"),
    )
}

/// Metrics for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: YearMonth,
    pub metrics: BreedingMetrics,
    pub counts: Counts,
}

/// A monthly series together with its month-over-month deltas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub series: Vec<MonthlyPoint>,
    pub deltas: Vec<DeltaPoint>,
}

impl TrendReport {
    pub fn from_series(series: Vec<MonthlyPoint>) -> Self {
        let deltas = delta(&series);
        Self { series, deltas }
    }
}

/// Runs the calculator over one month's window
pub fn monthly_point(
    calculator: &BreedingMetricsCalculator,
    owner_id: OwnerId,
    month: YearMonth,
    events: &[RawEvent],
) -> KpiResult<MonthlyPoint> {
    let report = calculator.compute(owner_id, &month.window(), events)?;
    Ok(MonthlyPoint {
        month,
        metrics: report.metrics,
        counts: report.counts,
    })
}

/// Builds a trend from per-month event batches.
///
/// Batches may arrive in any order; the series is always oldest first.
pub fn build_trend(
    calculator: &BreedingMetricsCalculator,
    owner_id: OwnerId,
    batches: impl IntoIterator<Item = (YearMonth, Vec<RawEvent>)>,
) -> KpiResult<TrendReport> {
    let mut series = batches
        .into_iter()
        .map(|(month, events)| monthly_point(calculator, owner_id, month, &events))
        .collect::<KpiResult<Vec<_>>>()?;
    series.sort_by_key(|point| point.month);
    Ok(TrendReport::from_series(series))
}
