//! Reporting windows and the widened retrieval windows derived from them

use super::errors::{KpiDomainError, KpiResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default length of a reporting window when the caller gives no bounds
pub const DEFAULT_WINDOW_DAYS: i64 = 365;

/// Largest span in days accepted for configured windows and expansions
pub const MAX_SPAN_DAYS: i64 = 36_500;

/// Checks a configured span against `0..=MAX_SPAN_DAYS`
pub(crate) fn validate_span_days(days: i64, field: &str) -> KpiResult<i64> {
    if !(0..=MAX_SPAN_DAYS).contains(&days) {
        return Err(KpiDomainError::validation(
            format!("must be between 0 and {MAX_SPAN_DAYS} days"),
            Some(field),
        ));
    }
    Ok(days)
}

/// `at` moved by `days`, or `None` when the result is not representable
fn shift_days(at: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    Duration::try_days(days).and_then(|delta| at.checked_add_signed(delta))
}

/// Closed interval `[from, to]` deciding which events count toward a KPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl ReportingWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> KpiResult<Self> {
        if from > to {
            return Err(KpiDomainError::period(
                "window start is after window end",
                Some(&format!("{}..{}", from.to_rfc3339(), to.to_rfc3339())),
            ));
        }
        Ok(Self { from, to })
    }

    /// For bounds the caller already knows are ordered
    pub(crate) fn between_ordered(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        debug_assert!(from <= to);
        Self { from, to }
    }

    /// `[to - days, to]`
    pub fn ending_at(to: DateTime<Utc>, days: i64) -> KpiResult<Self> {
        let from = shift_days(to, -days.max(0)).ok_or_else(|| {
            KpiDomainError::period(
                "window start is out of range",
                Some(&format!("{days} days before {}", to.to_rfc3339())),
            )
        })?;
        Ok(Self { from, to })
    }

    /// Resolves caller-supplied ISO-8601 bounds.
    ///
    /// A missing `to` defaults to `now`; a missing `from` defaults to
    /// `default_days` before the resolved `to`.
    pub fn resolve(
        from: Option<&str>,
        to: Option<&str>,
        now: DateTime<Utc>,
        default_days: i64,
    ) -> KpiResult<Self> {
        let to = match to {
            Some(raw) => parse_instant(raw, "to")?,
            None => now,
        };
        match from {
            Some(raw) => Self::new(parse_instant(raw, "from")?, to),
            None => Self::ending_at(to, default_days),
        }
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Both ends inclusive
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }

    /// Widens the window for event retrieval.
    ///
    /// Fails with a `PeriodError` when the widened bounds fall outside the
    /// representable date range.
    pub fn expand(&self, expansion: &WindowExpansion) -> KpiResult<ExpandedWindow> {
        let from = expansion
            .lookback_days
            .checked_neg()
            .and_then(|days| shift_days(self.from, days));
        let to = shift_days(self.to, expansion.lookahead_days);
        match (from, to) {
            (Some(from), Some(to)) => Ok(ExpandedWindow { from, to }),
            _ => Err(KpiDomainError::period(
                "window cannot be widened for event retrieval",
                Some(&format!(
                    "{}..{}",
                    self.from.to_rfc3339(),
                    self.to.to_rfc3339()
                )),
            )),
        }
    }
}

/// How far event retrieval reaches beyond the reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowExpansion {
    pub lookback_days: i64,
    pub lookahead_days: i64,
}

impl WindowExpansion {
    pub const DEFAULT_LOOKBACK_DAYS: i64 = 500;
    pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 300;

    pub fn new(lookback_days: i64, lookahead_days: i64) -> KpiResult<Self> {
        Ok(Self {
            lookback_days: validate_span_days(lookback_days, "lookback_days")?,
            lookahead_days: validate_span_days(lookahead_days, "lookahead_days")?,
        })
    }
}

impl Default for WindowExpansion {
    fn default() -> Self {
        Self {
            lookback_days: Self::DEFAULT_LOOKBACK_DAYS,
            lookahead_days: Self::DEFAULT_LOOKAHEAD_DAYS,
        }
    }
}

/// Retrieval range handed to the event loader. Never used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ExpandedWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a bare
/// date (midnight UTC), with a four-digit year from 0001 to 9999.
fn parse_instant(raw: &str, field: &str) -> KpiResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|midnight| midnight.and_utc())
        });

    match parsed {
        Some(at) if (1..=9999).contains(&at.year()) => Ok(at),
        _ => Err(KpiDomainError::validation(
            format!("'{trimmed}' is not an ISO-8601 datetime"),
            Some(field),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_contains_is_inclusive_on_both_ends() {
        let window = ReportingWindow::new(at(2024, 1, 1), at(2024, 12, 31)).unwrap();
        assert!(window.contains(at(2024, 1, 1)));
        assert!(window.contains(at(2024, 12, 31)));
        assert!(!window.contains(at(2023, 12, 31)));
        assert!(!window.contains(at(2024, 12, 31) + Duration::seconds(1)));
    }

    #[test]
    fn test_reversed_window_is_a_period_error() {
        let err = ReportingWindow::new(at(2024, 2, 1), at(2024, 1, 1)).unwrap_err();
        assert_eq!(err.kind(), "PeriodError");
    }

    #[test]
    fn test_expansion_defaults() {
        let window = ReportingWindow::new(at(2024, 1, 1), at(2024, 12, 31)).unwrap();
        let expanded = window.expand(&WindowExpansion::default()).unwrap();
        assert_eq!(expanded.from, at(2024, 1, 1) - Duration::days(500));
        assert_eq!(expanded.to, at(2024, 12, 31) + Duration::days(300));
        assert!(expanded.contains(window.from()));
        assert!(expanded.contains(window.to()));
    }

    #[test]
    fn test_resolve_defaults_to_trailing_year() {
        let now = at(2025, 6, 15);
        let window = ReportingWindow::resolve(None, None, now, DEFAULT_WINDOW_DAYS).unwrap();
        assert_eq!(window.to(), now);
        assert_eq!(window.from(), now - Duration::days(365));
    }

    #[rstest]
    #[case("2024-01-01", at(2024, 1, 1))]
    #[case("2024-01-01T00:00:00Z", at(2024, 1, 1))]
    #[case("2024-01-01T09:00:00+09:00", at(2024, 1, 1))]
    #[case("2024-01-01T00:00:00", at(2024, 1, 1))]
    fn test_resolve_accepts_iso_forms(#[case] raw: &str, #[case] expected: DateTime<Utc>) {
        let window =
            ReportingWindow::resolve(Some(raw), Some("2024-12-31"), at(2025, 1, 1), 365).unwrap();
        assert_eq!(window.from(), expected);
    }

    #[test]
    fn test_resolve_rejects_garbage_with_field_name() {
        let err = ReportingWindow::resolve(Some("last tuesday"), None, at(2025, 1, 1), 365)
            .unwrap_err();
        assert_eq!(
            err,
            KpiDomainError::validation(
                "'last tuesday' is not an ISO-8601 datetime",
                Some("from")
            )
        );
    }

    #[rstest]
    #[case("-262143-01-01")]
    #[case("+10000-01-01")]
    #[case("0000-06-01")]
    fn test_resolve_rejects_years_outside_four_digits(#[case] raw: &str) {
        let err = ReportingWindow::resolve(Some(raw), Some("2024-01-01"), at(2025, 1, 1), 365)
            .unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert_eq!(err.details().field.as_deref(), Some("from"));
    }

    #[test]
    fn test_expand_past_representable_range_is_a_period_error() {
        let earliest = DateTime::<Utc>::MIN_UTC;
        let window = ReportingWindow::new(earliest, earliest + Duration::days(10)).unwrap();
        let err = window.expand(&WindowExpansion::default()).unwrap_err();
        assert_eq!(err.kind(), "PeriodError");

        let unchecked = WindowExpansion {
            lookback_days: i64::MIN,
            lookahead_days: 0,
        };
        let window = ReportingWindow::new(at(2024, 1, 1), at(2024, 2, 1)).unwrap();
        assert!(window.expand(&unchecked).is_err());

        let latest = DateTime::<Utc>::MAX_UTC;
        let window = ReportingWindow::new(latest - Duration::days(10), latest).unwrap();
        assert!(window.expand(&WindowExpansion::default()).is_err());
    }

    #[test]
    fn test_ending_at_past_representable_range_is_a_period_error() {
        let err = ReportingWindow::ending_at(DateTime::<Utc>::MIN_UTC, 365).unwrap_err();
        assert_eq!(err.kind(), "PeriodError");
        assert_eq!(
            ReportingWindow::ending_at(at(2025, 1, 1), 1).unwrap().from(),
            at(2024, 12, 31)
        );
    }

    #[test]
    fn test_expansion_spans_are_bounded() {
        assert!(WindowExpansion::new(-1, 300).is_err());
        assert!(WindowExpansion::new(500, -1).is_err());
        assert!(WindowExpansion::new(MAX_SPAN_DAYS + 1, 300).is_err());
        assert!(WindowExpansion::new(500, i64::MAX).is_err());
        assert!(WindowExpansion::new(MAX_SPAN_DAYS, MAX_SPAN_DAYS).is_ok());
        assert_eq!(
            WindowExpansion::new(500, 300).unwrap(),
            WindowExpansion::default()
        );
    }
}
