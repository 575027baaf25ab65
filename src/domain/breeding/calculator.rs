//! Breeding metrics calculator
//!
//! Turns an owner's insemination and calving log into conception rate, days
//! open, calving interval and AI-per-conception for a reporting window.
//!
//! The event list is expected to span the *expanded* window so that pairs
//! straddling the reporting window's edges can still be matched; the
//! reporting window alone decides what is counted. Events are grouped per
//! animal and sorted here, so input order does not matter.

use super::errors::{KpiDomainError, KpiResult};
use super::events::{BreedingEventType, RawEvent};
use super::metrics::{
    round_to_tenth, AiPerConception, AverageDays, BreedingMetrics, ConceptionRate, Counts,
    MetricField, MetricsReport,
};
use super::window::ReportingWindow;
use crate::domain::identifiers::{CattleId, OwnerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Accepted insemination-to-calving gap, in days, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestationWindow {
    min_days: f64,
    max_days: f64,
}

impl GestationWindow {
    pub const DEFAULT_MIN_DAYS: f64 = 260.0;
    pub const DEFAULT_MAX_DAYS: f64 = 300.0;

    pub fn new(min_days: f64, max_days: f64) -> KpiResult<Self> {
        if !min_days.is_finite() || !max_days.is_finite() || min_days < 0.0 {
            return Err(KpiDomainError::validation(
                "gestation bounds must be finite and non-negative",
                Some("gestation_min_days"),
            ));
        }
        if min_days > max_days {
            return Err(KpiDomainError::validation(
                "gestation minimum exceeds maximum",
                Some("gestation_max_days"),
            ));
        }
        Ok(Self { min_days, max_days })
    }

    pub fn min_days(&self) -> f64 {
        self.min_days
    }

    pub fn max_days(&self) -> f64 {
        self.max_days
    }

    pub fn admits(&self, gap_days: f64) -> bool {
        self.min_days <= gap_days && gap_days <= self.max_days
    }
}

impl Default for GestationWindow {
    fn default() -> Self {
        Self {
            min_days: Self::DEFAULT_MIN_DAYS,
            max_days: Self::DEFAULT_MAX_DAYS,
        }
    }
}

/// Tunable rules for the calculator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BreedingRules {
    pub gestation: GestationWindow,
}

/// One animal's events, split by type and sorted ascending
#[derive(Debug, Default)]
struct AnimalHistory {
    inseminations: Vec<DateTime<Utc>>,
    calvings: Vec<DateTime<Utc>>,
}

impl AnimalHistory {
    fn sort(&mut self) {
        self.inseminations.sort_unstable();
        self.calvings.sort_unstable();
    }
}

/// Per-window accumulators before averaging
#[derive(Debug, Default)]
struct Tally {
    inseminations: usize,
    conceptions: usize,
    calvings: usize,
    days_open: Vec<f64>,
    calving_intervals: Vec<f64>,
    ai_trials: Vec<usize>,
}

/// Pure calculator over an already-loaded event list
#[derive(Debug, Clone, Copy, Default)]
pub struct BreedingMetricsCalculator {
    rules: BreedingRules,
}

impl BreedingMetricsCalculator {
    pub fn new(rules: BreedingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &BreedingRules {
        &self.rules
    }

    /// Computes metrics and counts for `window`.
    ///
    /// `owner_id` only labels the trace output; callers are responsible for
    /// handing in events that belong to that owner.
    pub fn compute(
        &self,
        owner_id: OwnerId,
        window: &ReportingWindow,
        events: &[RawEvent],
    ) -> KpiResult<MetricsReport> {
        let herd = group_by_animal(events);
        let mut tally = Tally::default();

        for history in herd.values() {
            self.tally_animal(history, window, &mut tally);
        }

        trace!(
            owner_id = %owner_id,
            animals = herd.len(),
            inseminations = tally.inseminations,
            conceptions = tally.conceptions,
            "Tallied breeding events"
        );

        let counts = Counts {
            inseminations: tally.inseminations,
            conceptions: tally.conceptions,
            calvings: tally.calvings,
            pairs_for_days_open: tally.days_open.len(),
        };
        let metrics = aggregate(&tally)?;
        Ok(MetricsReport { metrics, counts })
    }

    fn tally_animal(&self, history: &AnimalHistory, window: &ReportingWindow, tally: &mut Tally) {
        let inseminations = &history.inseminations;
        let calvings = &history.calvings;

        tally.inseminations += inseminations.iter().filter(|at| window.contains(**at)).count();
        tally.calvings += calvings.iter().filter(|at| window.contains(**at)).count();

        for pair in calvings.windows(2) {
            if window.contains(pair[1]) {
                tally.calving_intervals.push(days_between(pair[0], pair[1]));
            }
        }

        let mut claimed = vec![false; inseminations.len()];

        for (index, &calving) in calvings.iter().enumerate() {
            let Some(chosen) = self.match_conception(inseminations, &claimed, calving) else {
                continue;
            };
            claimed[chosen] = true;
            let conceived_at = inseminations[chosen];
            let previous_calving = index.checked_sub(1).map(|prev| calvings[prev]);

            if window.contains(calving) {
                tally.conceptions += 1;
            }

            if let Some(previous) = previous_calving {
                if conceived_at > previous && window.contains(conceived_at) {
                    tally.days_open.push(days_between(previous, conceived_at));
                }
            }

            let trials = inseminations
                .iter()
                .filter(|at| previous_calving.is_none_or(|previous| **at > previous))
                .filter(|at| **at <= conceived_at)
                .count();
            if trials > 0 {
                tally.ai_trials.push(trials);
            }
        }
    }

    /// Scans inseminations from the most recent one before `calving` back
    /// to the earliest and returns the first whose gap falls inside the
    /// gestation window. Earlier candidates never replace it.
    fn match_conception(
        &self,
        inseminations: &[DateTime<Utc>],
        claimed: &[bool],
        calving: DateTime<Utc>,
    ) -> Option<usize> {
        let before = inseminations.partition_point(|at| *at < calving);
        (0..before).rev().find(|&index| {
            !claimed[index]
                && self
                    .rules
                    .gestation
                    .admits(days_between(inseminations[index], calving))
        })
    }
}

/// Computes metrics with the default rules
pub fn compute_breeding_metrics(
    owner_id: OwnerId,
    window: &ReportingWindow,
    events: &[RawEvent],
) -> KpiResult<MetricsReport> {
    BreedingMetricsCalculator::default().compute(owner_id, window, events)
}

fn group_by_animal(events: &[RawEvent]) -> BTreeMap<CattleId, AnimalHistory> {
    let mut herd: BTreeMap<CattleId, AnimalHistory> = BTreeMap::new();
    for event in events {
        let history = herd.entry(event.cattle_id).or_default();
        match event.event_type {
            BreedingEventType::Insemination => history.inseminations.push(event.event_datetime),
            BreedingEventType::Calving => history.calvings.push(event.event_datetime),
        }
    }
    for history in herd.values_mut() {
        history.sort();
    }
    herd
}

fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let elapsed = later.signed_duration_since(earlier);
    elapsed.num_milliseconds() as f64 / 1_000.0 / SECONDS_PER_DAY
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let len = values.len();
    if len == 0 {
        return None;
    }
    Some(values.sum::<f64>() / len as f64)
}

fn aggregate(tally: &Tally) -> KpiResult<BreedingMetrics> {
    let conception_rate = if tally.inseminations > 0 {
        // Calvings in the window may stem from inseminations before it.
        let rate = (tally.conceptions as f64 / tally.inseminations as f64 * 100.0).min(100.0);
        Some(validated(
            MetricField::ConceptionRate,
            rate,
            ConceptionRate::try_new,
        )?)
    } else {
        None
    };

    let avg_days_open = mean(tally.days_open.iter().copied())
        .map(|avg| validated(MetricField::AvgDaysOpen, avg, AverageDays::try_new))
        .transpose()?;

    let avg_calving_interval = mean(tally.calving_intervals.iter().copied())
        .map(|avg| validated(MetricField::AvgCalvingInterval, avg, AverageDays::try_new))
        .transpose()?;

    let ai_per_conception = mean(tally.ai_trials.iter().map(|trials| *trials as f64))
        .map(|avg| validated(MetricField::AiPerConception, avg, AiPerConception::try_new))
        .transpose()?;

    Ok(BreedingMetrics {
        conception_rate,
        avg_days_open,
        avg_calving_interval,
        ai_per_conception,
    })
}

/// Rounds `raw` and wraps it in its metric type
fn validated<T, E>(
    field: MetricField,
    raw: f64,
    construct: impl FnOnce(f64) -> Result<T, E>,
) -> KpiResult<T> {
    if !raw.is_finite() {
        return Err(KpiDomainError::calculation(
            format!("{field} is not a finite number"),
            Some(&raw.to_string()),
        ));
    }
    let rounded = round_to_tenth(raw);
    construct(rounded).map_err(|_| {
        KpiDomainError::metric(
            "value outside the metric's domain",
            Some(field.as_str()),
            Some(rounded),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn cow(id: i64) -> CattleId {
        CattleId::try_new(id).unwrap()
    }

    fn owner() -> OwnerId {
        OwnerId::try_new(1).unwrap()
    }

    fn year_2024() -> ReportingWindow {
        ReportingWindow::new(at(2024, 1, 1), at(2024, 12, 31)).unwrap()
    }

    fn reference_herd() -> Vec<RawEvent> {
        vec![
            RawEvent::calving(cow(1), at(2024, 3, 1)),
            RawEvent::insemination(cow(1), at(2024, 3, 10)),
            RawEvent::insemination(cow(1), at(2024, 11, 15)),
            RawEvent::calving(cow(1), at(2024, 12, 1)),
            RawEvent::calving(cow(2), at(2024, 6, 1)),
            RawEvent::calving(cow(2), at(2024, 12, 10)),
        ]
    }

    #[test]
    fn test_reference_herd() {
        let report = compute_breeding_metrics(owner(), &year_2024(), &reference_herd()).unwrap();

        assert_eq!(
            report.counts,
            Counts {
                inseminations: 2,
                conceptions: 1,
                calvings: 4,
                pairs_for_days_open: 1,
            }
        );
        let metrics = report.metrics;
        assert_eq!(metrics.value(MetricField::ConceptionRate), Some(50.0));
        assert_eq!(metrics.value(MetricField::AvgDaysOpen), Some(9.0));
        assert_eq!(metrics.value(MetricField::AvgCalvingInterval), Some(233.5));
        assert_eq!(metrics.value(MetricField::AiPerConception), Some(1.0));
    }

    #[test]
    fn test_empty_input() {
        let report = compute_breeding_metrics(owner(), &year_2024(), &[]).unwrap();
        assert!(report.metrics.is_empty());
        assert_eq!(report.counts, Counts::default());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut shuffled = reference_herd();
        shuffled.reverse();
        shuffled.swap(0, 3);

        let sorted = compute_breeding_metrics(owner(), &year_2024(), &reference_herd()).unwrap();
        let unsorted = compute_breeding_metrics(owner(), &year_2024(), &shuffled).unwrap();
        assert_eq!(sorted, unsorted);
    }

    #[test]
    fn test_calvings_only_feed_calving_interval() {
        let events = vec![
            RawEvent::calving(cow(3), at(2023, 5, 1)),
            RawEvent::calving(cow(3), at(2024, 5, 1)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(
            report.metrics.value(MetricField::AvgCalvingInterval),
            Some(366.0)
        );
        assert_eq!(report.metrics.conception_rate, None);
        assert_eq!(report.metrics.avg_days_open, None);
        assert_eq!(report.metrics.ai_per_conception, None);
        assert_eq!(report.counts.calvings, 1);
    }

    #[test]
    fn test_calving_interval_needs_later_calving_in_window() {
        let events = vec![
            RawEvent::calving(cow(3), at(2024, 5, 1)),
            RawEvent::calving(cow(3), at(2025, 4, 1)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.metrics.avg_calving_interval, None);
    }

    #[test]
    fn test_unmatched_insemination_counts_only_in_denominator() {
        let events = vec![
            RawEvent::insemination(cow(4), at(2024, 2, 1)),
            RawEvent::calving(cow(4), at(2024, 5, 1)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.counts.inseminations, 1);
        assert_eq!(report.counts.conceptions, 0);
        assert_eq!(report.metrics.value(MetricField::ConceptionRate), Some(0.0));
        assert_eq!(report.metrics.ai_per_conception, None);
    }

    #[test]
    fn test_cross_boundary_pair_counts_conception() {
        // Inseminated before the window, calved inside it.
        let events = vec![
            RawEvent::insemination(cow(5), at(2023, 4, 1)),
            RawEvent::insemination(cow(5), at(2024, 3, 1)),
            RawEvent::calving(cow(5), at(2024, 1, 5)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.counts.conceptions, 1);
        assert_eq!(report.counts.inseminations, 1);
        assert_eq!(report.metrics.value(MetricField::ConceptionRate), Some(100.0));
        // No earlier calving, so no days open; all prior inseminations are trials.
        assert_eq!(report.counts.pairs_for_days_open, 0);
        assert_eq!(report.metrics.value(MetricField::AiPerConception), Some(1.0));
    }

    #[test]
    fn test_conception_rate_caps_at_hundred() {
        // Two calvings in 2024 from 2023 inseminations, one 2024 insemination.
        let events = vec![
            RawEvent::insemination(cow(12), at(2023, 5, 1)),
            RawEvent::calving(cow(12), at(2024, 2, 5)),
            RawEvent::insemination(cow(13), at(2023, 6, 1)),
            RawEvent::calving(cow(13), at(2024, 3, 5)),
            RawEvent::insemination(cow(13), at(2024, 6, 1)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.counts.conceptions, 2);
        assert_eq!(report.counts.inseminations, 1);
        assert_eq!(report.metrics.value(MetricField::ConceptionRate), Some(100.0));
    }

    #[test]
    fn test_gestation_bounds_are_inclusive() {
        let calving = at(2024, 10, 1);
        let exactly_min = calving - chrono::Duration::days(260);
        let exactly_max = calving - chrono::Duration::days(300);
        for conceived in [exactly_min, exactly_max] {
            let events = vec![
                RawEvent::insemination(cow(6), conceived),
                RawEvent::calving(cow(6), calving),
            ];
            let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
            assert_eq!(report.counts.conceptions, 1, "{conceived}");
        }

        let too_long = vec![
            RawEvent::insemination(cow(6), calving - chrono::Duration::days(301)),
            RawEvent::calving(cow(6), calving),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &too_long).unwrap();
        assert_eq!(report.counts.conceptions, 0);
    }

    #[test]
    fn test_backward_scan_keeps_most_recent_qualifying_insemination() {
        // Three inseminations qualify; the scan from the calving backward
        // meets the 265-day one first and keeps it, even though the
        // 280-day one sits closer to the typical gestation length.
        let calving = at(2024, 11, 1);
        let events = vec![
            RawEvent::calving(cow(7), at(2023, 9, 1)),
            RawEvent::insemination(cow(7), calving - chrono::Duration::days(295)),
            RawEvent::insemination(cow(7), calving - chrono::Duration::days(280)),
            RawEvent::insemination(cow(7), calving - chrono::Duration::days(265)),
            RawEvent::insemination(cow(7), calving - chrono::Duration::days(100)),
            RawEvent::calving(cow(7), calving),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();

        let chosen = calving - chrono::Duration::days(265);
        let expected_days_open = round_to_tenth(days_between(at(2023, 9, 1), chosen));
        assert_eq!(
            report.metrics.value(MetricField::AvgDaysOpen),
            Some(expected_days_open)
        );
        // All three candidates up to and including the chosen one are trials.
        assert_eq!(report.metrics.value(MetricField::AiPerConception), Some(3.0));
        assert_eq!(report.counts.conceptions, 1);
    }

    #[test]
    fn test_insemination_is_chosen_for_at_most_one_calving() {
        // Two calvings 20 days apart both sit within 260-300 days of the
        // single insemination; only the first may claim it.
        let conceived = at(2024, 1, 10);
        let events = vec![
            RawEvent::insemination(cow(8), conceived),
            RawEvent::calving(cow(8), conceived + chrono::Duration::days(270)),
            RawEvent::calving(cow(8), conceived + chrono::Duration::days(290)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.counts.conceptions, 1);
    }

    #[test]
    fn test_days_open_requires_insemination_in_window() {
        // Conceived in December 2023, calved in September 2024.
        let events = vec![
            RawEvent::calving(cow(9), at(2023, 2, 1)),
            RawEvent::insemination(cow(9), at(2023, 12, 1)),
            RawEvent::calving(cow(9), at(2024, 9, 5)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.counts.conceptions, 1);
        assert_eq!(report.counts.pairs_for_days_open, 0);
        assert_eq!(report.metrics.avg_days_open, None);
    }

    #[test]
    fn test_conception_before_previous_calving_has_no_days_open() {
        // Calving B matches an insemination that predates calving A.
        let conceived = at(2024, 1, 10);
        let events = vec![
            RawEvent::insemination(cow(14), conceived),
            RawEvent::calving(cow(14), at(2024, 1, 20)),
            RawEvent::calving(cow(14), conceived + chrono::Duration::days(270)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.counts.conceptions, 1);
        assert_eq!(report.counts.pairs_for_days_open, 0);
        assert_eq!(report.metrics.avg_days_open, None);
        assert_eq!(report.metrics.ai_per_conception, None);
    }

    #[test]
    fn test_ai_trials_count_attempts_since_previous_calving() {
        let events = vec![
            RawEvent::insemination(cow(10), at(2023, 1, 1)),
            RawEvent::calving(cow(10), at(2023, 3, 1)),
            RawEvent::insemination(cow(10), at(2023, 4, 1)),
            RawEvent::insemination(cow(10), at(2023, 5, 1)),
            RawEvent::insemination(cow(10), at(2023, 6, 1)),
            RawEvent::calving(cow(10), at(2024, 3, 10)),
        ];
        let report = compute_breeding_metrics(owner(), &year_2024(), &events).unwrap();
        // 2023-06-01 -> 2024-03-10 is 283 days; the two earlier attempts
        // after the March 2023 calving add to the trial count.
        assert_eq!(report.metrics.value(MetricField::AiPerConception), Some(3.0));
    }

    #[test]
    fn test_custom_gestation_window() {
        let rules = BreedingRules {
            gestation: GestationWindow::new(270.0, 290.0).unwrap(),
        };
        let calculator = BreedingMetricsCalculator::new(rules);
        let events = vec![
            RawEvent::insemination(cow(11), at(2024, 1, 1)),
            RawEvent::calving(cow(11), at(2024, 1, 1) + chrono::Duration::days(265)),
        ];
        let report = calculator.compute(owner(), &year_2024(), &events).unwrap();
        assert_eq!(report.counts.conceptions, 0);
    }

    #[test]
    fn test_gestation_window_validation() {
        assert!(GestationWindow::new(300.0, 260.0).is_err());
        assert!(GestationWindow::new(-1.0, 260.0).is_err());
        assert!(GestationWindow::new(f64::NAN, 260.0).is_err());
        assert_eq!(
            GestationWindow::new(260.0, 300.0).unwrap(),
            GestationWindow::default()
        );
    }

    #[test]
    fn test_validated_reports_metric_errors() {
        let err = validated(MetricField::ConceptionRate, 150.0, ConceptionRate::try_new)
            .unwrap_err();
        assert_eq!(
            err,
            KpiDomainError::metric(
                "value outside the metric's domain",
                Some("conceptionRate"),
                Some(150.0)
            )
        );

        let err = validated(MetricField::AvgDaysOpen, f64::NAN, AverageDays::try_new).unwrap_err();
        assert_eq!(err.kind(), "CalculationError");
    }
}
