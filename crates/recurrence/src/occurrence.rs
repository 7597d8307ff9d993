//! [`OccurrenceGenerator`]: upcoming reminder timestamps for a rule.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use tracing::debug;

use cadence_core::config::{SchedulerConfig, DEFAULT_MAX_SCAN_PERIODS};
use cadence_core::{RecurrenceRule, Reminder};

use crate::stream::{first_period_on_or_after, CandidateDates};

/// Cap on periods scanned per query unless configured otherwise.
pub const MAX_SCAN_PERIODS: u32 = DEFAULT_MAX_SCAN_PERIODS;

/// Turns a rule plus a reminder time-of-day into concrete future timestamps.
///
/// The generator holds no mutable state: the same rule, reminder and
/// reference time always give the same output. "Now" is always passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceGenerator {
    max_scan_periods: u32,
}

impl OccurrenceGenerator {
    /// Generator with the default period cap ([`MAX_SCAN_PERIODS`]).
    pub fn new() -> Self {
        Self {
            max_scan_periods: MAX_SCAN_PERIODS,
        }
    }

    /// Generator with a custom period cap (at least 1).
    pub fn with_max_scan_periods(max_scan_periods: u32) -> Self {
        Self {
            max_scan_periods: max_scan_periods.max(1),
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::with_max_scan_periods(config.max_scan_periods)
    }

    pub fn max_scan_periods(&self) -> u32 {
        self.max_scan_periods
    }

    /// Up to `count` occurrences strictly after `reference_now`, ascending.
    ///
    /// Timestamps are built in `reference_now`'s timezone. The scan starts at
    /// the first period that can still reach `reference_now`'s date and
    /// stops after `max_scan_periods` periods, so fewer than `count` results
    /// come back when the rule rarely matches (e.g. fifth-weekday rules).
    pub fn next_occurrences<Tz: TimeZone>(
        &self,
        rule: &RecurrenceRule,
        reminder: &Reminder,
        count: usize,
        reference_now: &DateTime<Tz>,
    ) -> Vec<DateTime<Tz>> {
        let mut results: Vec<DateTime<Tz>> = Vec::with_capacity(count);
        if count == 0 {
            return results;
        }

        let zone = reference_now.timezone();
        let start = first_period_on_or_after(rule, reference_now.date_naive());
        let mut scanned = 0u32;

        for dates in CandidateDates::starting_at(rule, start).take(self.max_scan_periods as usize) {
            scanned += 1;
            for date in dates {
                let Some(at) = combine(&zone, date, reminder) else {
                    continue;
                };
                if at <= *reference_now {
                    continue;
                }
                if results.last().is_some_and(|last| at <= *last) {
                    continue;
                }
                results.push(at);
                if results.len() == count {
                    return results;
                }
            }
        }

        debug!(
            frequency = %rule.frequency(),
            anchor = %rule.anchor(),
            scanned,
            found = results.len(),
            requested = count,
            "occurrence scan ended before reaching requested count"
        );
        results
    }

    /// The first occurrence strictly after `reference_now`, if any.
    pub fn next_occurrence<Tz: TimeZone>(
        &self,
        rule: &RecurrenceRule,
        reminder: &Reminder,
        reference_now: &DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        self.next_occurrences(rule, reminder, 1, reference_now)
            .into_iter()
            .next()
    }
}

impl Default for OccurrenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// [`OccurrenceGenerator::next_occurrences`] with the default period cap.
pub fn next_occurrences<Tz: TimeZone>(
    rule: &RecurrenceRule,
    reminder: &Reminder,
    count: usize,
    reference_now: &DateTime<Tz>,
) -> Vec<DateTime<Tz>> {
    OccurrenceGenerator::new().next_occurrences(rule, reminder, count, reference_now)
}

/// Place the reminder's wall-clock time on `date` in `zone`.
///
/// Ambiguous local times take the earlier instant; times that fall into a
/// DST gap move one hour forward.
fn combine<Tz: TimeZone>(zone: &Tz, date: NaiveDate, reminder: &Reminder) -> Option<DateTime<Tz>> {
    let local = date.and_time(reminder.time_of_day);
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(local + Duration::hours(1))).earliest())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use cadence_core::MonthlySelector;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn zero_count_returns_nothing() {
        let rule = RecurrenceRule::daily(date(2025, 1, 1), 1).unwrap();
        let reminder = Reminder::new("r", 9, 0).unwrap();
        assert!(next_occurrences(&rule, &reminder, 0, &at(2025, 1, 1, 0, 0)).is_empty());
    }

    #[test]
    fn same_day_time_already_passed_moves_to_next_period() {
        let rule = RecurrenceRule::daily(date(2025, 1, 1), 1).unwrap();
        let reminder = Reminder::new("r", 9, 0).unwrap();
        let now = at(2025, 3, 10, 9, 0);
        assert_eq!(
            next_occurrences(&rule, &reminder, 2, &now),
            vec![at(2025, 3, 11, 9, 0), at(2025, 3, 12, 9, 0)]
        );
        let earlier = at(2025, 3, 10, 8, 59);
        assert_eq!(
            next_occurrences(&rule, &reminder, 1, &earlier),
            vec![at(2025, 3, 10, 9, 0)]
        );
    }

    #[test]
    fn anchor_far_in_past_does_not_exhaust_cap() {
        let rule = RecurrenceRule::daily(date(2015, 1, 1), 1).unwrap();
        let reminder = Reminder::new("r", 7, 30).unwrap();
        let generator = OccurrenceGenerator::with_max_scan_periods(5);
        let found = generator.next_occurrences(&rule, &reminder, 3, &at(2025, 6, 1, 12, 0));
        assert_eq!(
            found,
            vec![at(2025, 6, 2, 7, 30), at(2025, 6, 3, 7, 30), at(2025, 6, 4, 7, 30)]
        );
    }

    #[test]
    fn period_cap_limits_sparse_rules() {
        // Fifth Thursday: only 5 of the 12 months from May 2025 have one.
        let rule = RecurrenceRule::monthly(date(2025, 5, 29), 1, MonthlySelector::weeks([4]).unwrap())
            .unwrap();
        let reminder = Reminder::new("r", 10, 0).unwrap();
        let generator = OccurrenceGenerator::with_max_scan_periods(12);
        let found = generator.next_occurrences(&rule, &reminder, 12, &at(2025, 5, 1, 0, 0));
        assert_eq!(
            found,
            vec![
                at(2025, 5, 29, 10, 0),
                at(2025, 7, 31, 10, 0),
                at(2025, 10, 30, 10, 0),
                at(2026, 1, 29, 10, 0),
                at(2026, 4, 30, 10, 0),
            ]
        );
    }

    #[test]
    fn timestamps_use_reference_zone() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let rule = RecurrenceRule::daily(date(2025, 7, 1), 1).unwrap();
        let reminder = Reminder::new("r", 9, 0).unwrap();
        let now = zone.with_ymd_and_hms(2025, 7, 1, 8, 0, 0).unwrap();
        let found = next_occurrences(&rule, &reminder, 1, &now);
        assert_eq!(found, vec![zone.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap()]);
        assert_eq!(found[0].with_timezone(&Utc), at(2025, 7, 1, 7, 0));
    }

    #[test]
    fn next_occurrence_matches_first_of_list() {
        let rule = RecurrenceRule::yearly(date(2024, 2, 29), 1).unwrap();
        let reminder = Reminder::new("r", 8, 0).unwrap();
        let now = at(2024, 3, 1, 0, 0);
        assert_eq!(
            OccurrenceGenerator::new().next_occurrence(&rule, &reminder, &now),
            Some(at(2025, 2, 28, 8, 0))
        );
    }

    #[test]
    fn dst_gap_moves_one_hour_forward() {
        let zone = chrono_tz::America::New_York;
        let rule = RecurrenceRule::daily(date(2025, 3, 1), 1).unwrap();
        let reminder = Reminder::new("r", 2, 30).unwrap();
        let now = zone.with_ymd_and_hms(2025, 3, 8, 12, 0, 0).unwrap();

        let found: Vec<_> = next_occurrences(&rule, &reminder, 2, &now)
            .iter()
            .map(|t| t.with_timezone(&Utc))
            .collect();
        // 02:30 does not exist on Mar 9; 03:30 EDT is 07:30 UTC.
        assert_eq!(found, vec![at(2025, 3, 9, 7, 30), at(2025, 3, 10, 6, 30)]);
    }

    #[test]
    fn dst_overlap_takes_earlier_instant() {
        let zone = chrono_tz::America::New_York;
        let rule = RecurrenceRule::daily(date(2025, 10, 1), 1).unwrap();
        let reminder = Reminder::new("r", 1, 30).unwrap();
        let now = zone.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap();

        let found: Vec<_> = next_occurrences(&rule, &reminder, 2, &now)
            .iter()
            .map(|t| t.with_timezone(&Utc))
            .collect();
        // 01:30 happens twice on Nov 2; the EDT one is 05:30 UTC.
        assert_eq!(found, vec![at(2025, 11, 2, 5, 30), at(2025, 11, 3, 6, 30)]);
    }
}
