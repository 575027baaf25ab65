//! Breeding KPI values and the raw counts behind them
//!
//! Every metric is optional: `None` (serialized as `null`) means the period
//! had too little data to produce a value, which is different from zero.

use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage of in-window inseminations that led to an in-window calving
#[nutype(
    validate(finite, greater_or_equal = 0.0, less_or_equal = 100.0),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)
)]
pub struct ConceptionRate(f64);

/// Mean number of days, used for days open and calving interval
#[nutype(
    validate(finite, greater_or_equal = 0.0),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)
)]
pub struct AverageDays(f64);

/// Mean number of insemination attempts per conception
#[nutype(
    validate(finite, greater_or_equal = 0.0),
    derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)
)]
pub struct AiPerConception(f64);

/// Rounds to one decimal place, halves away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Names of the four breeding metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    ConceptionRate,
    AvgDaysOpen,
    AvgCalvingInterval,
    AiPerConception,
}

impl MetricField {
    pub const ALL: [Self; 4] = [
        Self::ConceptionRate,
        Self::AvgDaysOpen,
        Self::AvgCalvingInterval,
        Self::AiPerConception,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConceptionRate => "conceptionRate",
            Self::AvgDaysOpen => "avgDaysOpen",
            Self::AvgCalvingInterval => "avgCalvingInterval",
            Self::AiPerConception => "aiPerConception",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four breeding KPIs for one reporting window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreedingMetrics {
    pub conception_rate: Option<ConceptionRate>,
    pub avg_days_open: Option<AverageDays>,
    pub avg_calving_interval: Option<AverageDays>,
    pub ai_per_conception: Option<AiPerConception>,
}

impl BreedingMetrics {
    /// All metrics absent
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn value(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::ConceptionRate => self.conception_rate.map(ConceptionRate::into_inner),
            MetricField::AvgDaysOpen => self.avg_days_open.map(AverageDays::into_inner),
            MetricField::AvgCalvingInterval => {
                self.avg_calving_interval.map(AverageDays::into_inner)
            }
            MetricField::AiPerConception => self.ai_per_conception.map(AiPerConception::into_inner),
        }
    }

    pub fn is_empty(&self) -> bool {
        MetricField::ALL.iter().all(|f| self.value(*f).is_none())
    }
}

/// Raw tallies behind the metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    /// Inseminations inside the reporting window
    pub inseminations: usize,
    /// Matched calvings inside the reporting window
    pub conceptions: usize,
    /// Calvings inside the reporting window, matched or not
    pub calvings: usize,
    /// Days-open intervals that went into the average
    pub pairs_for_days_open: usize,
}

/// Output of one calculator run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metrics: BreedingMetrics,
    pub counts: Counts,
}
