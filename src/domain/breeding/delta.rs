//! Month-over-month change in breeding metrics

use super::metrics::{BreedingMetrics, MetricField};
use super::month::YearMonth;
use super::trend::MonthlyPoint;
use serde::{Deserialize, Serialize};

/// Signed change per metric; `None` when either side is missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDelta {
    pub conception_rate: Option<f64>,
    pub avg_days_open: Option<f64>,
    pub avg_calving_interval: Option<f64>,
    pub ai_per_conception: Option<f64>,
}

impl MetricsDelta {
    /// No comparison available
    pub fn empty() -> Self {
        Self::default()
    }

    /// `current - previous`, field by field
    pub fn between(current: &BreedingMetrics, previous: &BreedingMetrics) -> Self {
        let diff = |field: MetricField| match (current.value(field), previous.value(field)) {
            (Some(now), Some(before)) => Some(now - before),
            _ => None,
        };
        Self {
            conception_rate: diff(MetricField::ConceptionRate),
            avg_days_open: diff(MetricField::AvgDaysOpen),
            avg_calving_interval: diff(MetricField::AvgCalvingInterval),
            ai_per_conception: diff(MetricField::AiPerConception),
        }
    }

    pub fn value(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::ConceptionRate => self.conception_rate,
            MetricField::AvgDaysOpen => self.avg_days_open,
            MetricField::AvgCalvingInterval => self.avg_calving_interval,
            MetricField::AiPerConception => self.ai_per_conception,
        }
    }

    pub fn is_empty(&self) -> bool {
        MetricField::ALL.iter().all(|f| self.value(*f).is_none())
    }
}

/// Change relative to the previous point of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaPoint {
    pub month: YearMonth,
    pub metrics: MetricsDelta,
}

/// One delta per series point; the first has no predecessor and is empty
pub fn delta(series: &[MonthlyPoint]) -> Vec<DeltaPoint> {
    series
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let metrics = match index.checked_sub(1).map(|prev| &series[prev]) {
                Some(previous) => MetricsDelta::between(&point.metrics, &previous.metrics),
                None => MetricsDelta::empty(),
            };
            DeltaPoint {
                month: point.month,
                metrics,
            }
        })
        .collect()
}

/// Latest month-over-month change, as returned by the delta entry point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaSummary {
    pub month: Option<YearMonth>,
    pub delta: MetricsDelta,
}

impl DeltaSummary {
    pub fn empty() -> Self {
        Self {
            month: None,
            delta: MetricsDelta::empty(),
        }
    }

    /// Last entry of `deltas`, or [`DeltaSummary::empty`] when there is none
    pub fn latest(deltas: &[DeltaPoint]) -> Self {
        deltas
            .last()
            .map(|point| Self {
                month: Some(point.month),
                delta: point.metrics,
            })
            .unwrap_or_else(Self::empty)
    }
}
