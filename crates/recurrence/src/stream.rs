//! Candidate date stream: the calendar dates a rule selects, period by period.
//!
//! Period `p` covers the unit that lies `p * interval` units after the
//! anchor's unit (day, Monday-started week, month or year). Dates within a
//! period come out ascending, and every date of period `p` precedes every
//! date of period `p + 1`. Dates before the anchor are never produced.

use chrono::{Datelike, Days, NaiveDate};

use cadence_core::{MonthlySelector, RecurrencePattern, RecurrenceRule};

use crate::calendar::{add_months, clamped_day_of_month, months_between, nth_weekday_of_month, week_start};

/// Unbounded iterator over a rule's periods.
///
/// Each item is the (possibly empty) list of dates selected in one period. A
/// week-based monthly rule yields empty periods for months without the
/// requested weekday ordinal; iteration only ends once the calendar itself
/// runs out of representable dates.
#[derive(Debug, Clone)]
pub struct CandidateDates<'a> {
    rule: &'a RecurrenceRule,
    next_period: u64,
}

impl<'a> CandidateDates<'a> {
    /// Stream starting at the anchor's own period.
    pub fn new(rule: &'a RecurrenceRule) -> Self {
        Self::starting_at(rule, 0)
    }

    /// Stream starting at period index `period`.
    pub fn starting_at(rule: &'a RecurrenceRule, period: u64) -> Self {
        Self {
            rule,
            next_period: period,
        }
    }

    /// Index of the period the next call to `next` produces.
    pub fn next_period(&self) -> u64 {
        self.next_period
    }
}

impl Iterator for CandidateDates<'_> {
    type Item = Vec<NaiveDate>;

    fn next(&mut self) -> Option<Self::Item> {
        let dates = dates_in_period(self.rule, self.next_period)?;
        self.next_period += 1;
        Some(dates)
    }
}

/// Dates the rule selects in period `period`, ascending.
///
/// `None` when the period lies beyond the representable calendar.
pub fn dates_in_period(rule: &RecurrenceRule, period: u64) -> Option<Vec<NaiveDate>> {
    let anchor = rule.anchor();
    let units = period.checked_mul(u64::from(rule.interval()))?;

    let mut dates = match rule.pattern() {
        RecurrencePattern::Daily => vec![anchor.checked_add_days(Days::new(units))?],
        RecurrencePattern::Weekly(weekdays) => {
            let start = week_start(anchor).checked_add_days(Days::new(units.checked_mul(7)?))?;
            weekdays
                .iter()
                .map(|day| start.checked_add_days(Days::new(u64::from(day.num_days_from_monday()))))
                .collect::<Option<Vec<_>>>()?
        }
        RecurrencePattern::Monthly(selector) => {
            let (year, month) = add_months(anchor.year(), anchor.month(), u32::try_from(units).ok()?)?;
            // Probe the month itself so overflow ends the stream even when
            // no selector matches.
            NaiveDate::from_ymd_opt(year, month, 1)?;
            match selector {
                MonthlySelector::DaysOfMonth(days) => days
                    .iter()
                    .filter_map(|&d| {
                        NaiveDate::from_ymd_opt(year, month, clamped_day_of_month(year, month, u32::from(d)))
                    })
                    .collect(),
                MonthlySelector::WeeksOfMonth(weeks) => weeks
                    .iter()
                    .filter_map(|&n| nth_weekday_of_month(year, month, rule.anchor_weekday(), n))
                    .collect(),
            }
        }
        RecurrencePattern::Yearly => {
            let year = anchor.year().checked_add(i32::try_from(units).ok()?)?;
            let day = clamped_day_of_month(year, anchor.month(), anchor.day());
            vec![NaiveDate::from_ymd_opt(year, anchor.month(), day)?]
        }
    };

    // Clamping can fold several days (e.g. 30 and 31 in February) onto one.
    dates.dedup();
    dates.retain(|d| *d >= anchor);
    Some(dates)
}

/// First period that can contain a date on or after `date`.
///
/// Every earlier period holds only dates strictly before `date`, so scans
/// may start here without losing results.
pub fn first_period_on_or_after(rule: &RecurrenceRule, date: NaiveDate) -> u64 {
    let anchor = rule.anchor();
    if date <= anchor {
        return 0;
    }

    let elapsed_units = match rule.pattern() {
        RecurrencePattern::Daily => (date - anchor).num_days(),
        RecurrencePattern::Weekly(_) => (week_start(date) - week_start(anchor)).num_days() / 7,
        RecurrencePattern::Monthly(_) => {
            months_between(anchor.year(), anchor.month(), date.year(), date.month())
        }
        RecurrencePattern::Yearly => i64::from(date.year() - anchor.year()),
    };

    u64::try_from(elapsed_units).unwrap_or(0) / u64::from(rule.interval())
}
