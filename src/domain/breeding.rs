//! Breeding performance indicators
//!
//! Conception rate, days open, calving interval and AI-per-conception
//! computed from a herd's insemination and calving log, plus the monthly
//! trend and month-over-month delta views built on top of them.

pub mod calculator;
pub mod delta;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod month;
pub mod trend;
pub mod window;

// Re-export commonly used types
pub use calculator::{
    compute_breeding_metrics, BreedingMetricsCalculator, BreedingRules, GestationWindow,
};
pub use delta::{delta, DeltaPoint, DeltaSummary, MetricsDelta};
pub use errors::{ErrorDetails, KpiDomainError, KpiResult, PublicError};
pub use events::{BreedingEventType, RawEvent, UnknownEventType};
pub use metrics::{
    AiPerConception, AverageDays, BreedingMetrics, ConceptionRate, Counts, MetricField,
    MetricsReport,
};
pub use month::YearMonth;
pub use trend::{
    build_trend, monthly_point, MonthlyPoint, TrendLimits, TrendReport, TrendRequest,
    DEFAULT_TREND_MONTHS, DELTA_MONTHS, MAX_TREND_MONTHS,
};
pub use window::{
    ExpandedWindow, ReportingWindow, WindowExpansion, DEFAULT_WINDOW_DAYS, MAX_SPAN_DAYS,
};
