//! Recurrence rule model.
//!
//! A [`RecurrenceRule`] is an anchor date, an interval ("every N units") and a
//! [`RecurrencePattern`] naming the unit plus its selectors. The monthly
//! day-based / week-based split is a tagged variant ([`MonthlySelector`]), so a
//! rule can never carry both selector sets.
//!
//! Selector conventions differ on purpose:
//! - days of month are calendar days, 1-based (1 = first of the month);
//! - weeks of month are ordinals of the anchor weekday, 0-based
//!   (0 = first Saturday, 4 = fifth Saturday).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ModelError, Result};

/// Highest selectable day of month.
pub const MAX_DAY_OF_MONTH: u8 = 31;

/// Highest selectable week-of-month ordinal (0-based, so the fifth occurrence).
pub const MAX_WEEK_OF_MONTH: u8 = 4;

/// Recurrence granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Yearly => write!(f, "yearly"),
        }
    }
}

// ── Weekday set ───────────────────────────────────────────────

/// Set of weekdays, iterated Monday first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Selected weekdays in Monday..Sunday order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        let mut day = Weekday::Mon;
        (0..7).filter_map(move |_| {
            let current = day;
            day = day.succ();
            self.contains(current).then_some(current)
        })
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let days = Vec::<Weekday>::deserialize(deserializer)?;
        Ok(days.into_iter().collect())
    }
}

// ── Monthly selector ──────────────────────────────────────────

/// Which days a monthly rule lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthlySelector {
    /// Calendar days (1..=31), clamped to the month's last day.
    DaysOfMonth(BTreeSet<u8>),
    /// 0-based ordinals (0..=4) of the anchor weekday within the month.
    WeeksOfMonth(BTreeSet<u8>),
}

impl MonthlySelector {
    /// Day-based selector. Rejects an empty set and days outside 1..=31.
    pub fn days<I: IntoIterator<Item = u8>>(days: I) -> Result<Self> {
        let selector = MonthlySelector::DaysOfMonth(days.into_iter().collect());
        selector.validate()?;
        Ok(selector)
    }

    /// Week-based selector. Rejects an empty set and ordinals above 4.
    pub fn weeks<I: IntoIterator<Item = u8>>(weeks: I) -> Result<Self> {
        let selector = MonthlySelector::WeeksOfMonth(weeks.into_iter().collect());
        selector.validate()?;
        Ok(selector)
    }

    fn validate(&self) -> Result<()> {
        match self {
            MonthlySelector::DaysOfMonth(days) => {
                if days.is_empty() {
                    return Err(ModelError::EmptyMonthlySelector);
                }
                if let Some(&day) = days.iter().find(|&&d| d == 0 || d > MAX_DAY_OF_MONTH) {
                    return Err(ModelError::DayOfMonthOutOfRange(day));
                }
            }
            MonthlySelector::WeeksOfMonth(weeks) => {
                if weeks.is_empty() {
                    return Err(ModelError::EmptyMonthlySelector);
                }
                if let Some(&week) = weeks.iter().find(|&&w| w > MAX_WEEK_OF_MONTH) {
                    return Err(ModelError::WeekOfMonthOutOfRange(week));
                }
            }
        }
        Ok(())
    }
}

// ── Pattern & rule ────────────────────────────────────────────

/// Recurrence unit together with the selectors that unit uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrencePattern {
    Daily,
    Weekly(WeekdaySet),
    Monthly(MonthlySelector),
    Yearly,
}

impl RecurrencePattern {
    pub fn frequency(&self) -> Frequency {
        match self {
            RecurrencePattern::Daily => Frequency::Daily,
            RecurrencePattern::Weekly(_) => Frequency::Weekly,
            RecurrencePattern::Monthly(_) => Frequency::Monthly,
            RecurrencePattern::Yearly => Frequency::Yearly,
        }
    }
}

/// A validated recurrence rule.
///
/// Construct through [`RecurrenceRule::new`] or the per-frequency helpers;
/// every constructor enforces `interval >= 1` and non-empty, in-range
/// selectors. Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct RecurrenceRule {
    anchor: NaiveDate,
    interval: u32,
    pattern: RecurrencePattern,
}

impl RecurrenceRule {
    pub fn new(anchor: NaiveDate, interval: u32, pattern: RecurrencePattern) -> Result<Self> {
        if interval < 1 {
            return Err(ModelError::InvalidInterval(interval));
        }
        match &pattern {
            RecurrencePattern::Weekly(days) if days.is_empty() => {
                return Err(ModelError::EmptyWeekdays);
            }
            RecurrencePattern::Monthly(selector) => selector.validate()?,
            _ => {}
        }
        Ok(Self {
            anchor,
            interval,
            pattern,
        })
    }

    pub fn daily(anchor: NaiveDate, interval: u32) -> Result<Self> {
        Self::new(anchor, interval, RecurrencePattern::Daily)
    }

    pub fn weekly(anchor: NaiveDate, interval: u32, weekdays: WeekdaySet) -> Result<Self> {
        Self::new(anchor, interval, RecurrencePattern::Weekly(weekdays))
    }

    pub fn monthly(anchor: NaiveDate, interval: u32, selector: MonthlySelector) -> Result<Self> {
        Self::new(anchor, interval, RecurrencePattern::Monthly(selector))
    }

    pub fn yearly(anchor: NaiveDate, interval: u32) -> Result<Self> {
        Self::new(anchor, interval, RecurrencePattern::Yearly)
    }

    /// Date the rule is defined relative to.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Weekday that week-based monthly rules lock onto.
    pub fn anchor_weekday(&self) -> Weekday {
        self.anchor.weekday()
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn pattern(&self) -> &RecurrencePattern {
        &self.pattern
    }

    pub fn frequency(&self) -> Frequency {
        self.pattern.frequency()
    }
}

/// Flat storage shape of a rule, as written in task files.
///
/// Selector lists that do not belong to the rule's frequency are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRule {
    frequency: Frequency,
    #[serde(default = "default_every")]
    every: u32,
    start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    repeat_on: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    days_of_month: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    weeks_of_month: Vec<u8>,
}

fn default_every() -> u32 {
    1
}

impl TryFrom<RawRule> for RecurrenceRule {
    type Error = ModelError;

    fn try_from(raw: RawRule) -> Result<Self> {
        let pattern = match raw.frequency {
            Frequency::Daily => RecurrencePattern::Daily,
            Frequency::Weekly => RecurrencePattern::Weekly(raw.repeat_on.into_iter().collect()),
            Frequency::Monthly => {
                let selector = match (raw.days_of_month.is_empty(), raw.weeks_of_month.is_empty()) {
                    (false, false) => return Err(ModelError::ConflictingMonthlySelector),
                    (true, true) => return Err(ModelError::EmptyMonthlySelector),
                    (false, true) => MonthlySelector::DaysOfMonth(raw.days_of_month.into_iter().collect()),
                    (true, false) => MonthlySelector::WeeksOfMonth(raw.weeks_of_month.into_iter().collect()),
                };
                RecurrencePattern::Monthly(selector)
            }
            Frequency::Yearly => RecurrencePattern::Yearly,
        };
        RecurrenceRule::new(raw.start_date, raw.every, pattern)
    }
}

impl From<RecurrenceRule> for RawRule {
    fn from(rule: RecurrenceRule) -> Self {
        let mut raw = RawRule {
            frequency: rule.frequency(),
            every: rule.interval,
            start_date: rule.anchor,
            repeat_on: Vec::new(),
            days_of_month: Vec::new(),
            weeks_of_month: Vec::new(),
        };
        match rule.pattern {
            RecurrencePattern::Weekly(days) => raw.repeat_on = days.iter().collect(),
            RecurrencePattern::Monthly(MonthlySelector::DaysOfMonth(days)) => {
                raw.days_of_month = days.into_iter().collect()
            }
            RecurrencePattern::Monthly(MonthlySelector::WeeksOfMonth(weeks)) => {
                raw.weeks_of_month = weeks.into_iter().collect()
            }
            RecurrencePattern::Daily | RecurrencePattern::Yearly => {}
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert_eq!(
            RecurrenceRule::daily(date(2025, 1, 1), 0),
            Err(ModelError::InvalidInterval(0))
        );
    }

    #[test]
    fn empty_monthly_selectors_are_rejected() {
        assert_eq!(
            MonthlySelector::days(Vec::new()),
            Err(ModelError::EmptyMonthlySelector)
        );
        assert_eq!(
            MonthlySelector::weeks(Vec::new()),
            Err(ModelError::EmptyMonthlySelector)
        );
        let rule = RecurrenceRule::monthly(
            date(2025, 1, 1),
            1,
            MonthlySelector::DaysOfMonth(BTreeSet::new()),
        );
        assert_eq!(rule, Err(ModelError::EmptyMonthlySelector));
    }

    #[test]
    fn out_of_range_selectors_are_rejected() {
        assert_eq!(
            MonthlySelector::days([0]),
            Err(ModelError::DayOfMonthOutOfRange(0))
        );
        assert_eq!(
            MonthlySelector::days([15, 32]),
            Err(ModelError::DayOfMonthOutOfRange(32))
        );
        assert_eq!(
            MonthlySelector::weeks([5]),
            Err(ModelError::WeekOfMonthOutOfRange(5))
        );
    }

    #[test]
    fn weekly_without_weekdays_is_rejected() {
        assert_eq!(
            RecurrenceRule::weekly(date(2025, 1, 1), 1, WeekdaySet::new()),
            Err(ModelError::EmptyWeekdays)
        );
    }

    #[test]
    fn weekday_set_iterates_monday_first() {
        let set: WeekdaySet = [Weekday::Sun, Weekday::Wed, Weekday::Mon, Weekday::Wed]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Sun]
        );
        assert!(set.contains(Weekday::Sun));
        assert!(!set.contains(Weekday::Fri));
    }

    #[test]
    fn anchor_weekday_follows_anchor_date() {
        let rule =
            RecurrenceRule::monthly(date(2025, 7, 12), 1, MonthlySelector::weeks([1]).unwrap())
                .unwrap();
        assert_eq!(rule.anchor_weekday(), Weekday::Sat);
        assert_eq!(rule.frequency(), Frequency::Monthly);
    }

    #[test]
    fn deserialize_week_based_monthly_rule() {
        let yaml = "frequency: monthly\nevery: 2\nstart_date: 2025-01-08\nweeks_of_month: [1]\n";
        let rule: RecurrenceRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.interval(), 2);
        assert_eq!(rule.anchor(), date(2025, 1, 8));
        assert_eq!(
            rule.pattern(),
            &RecurrencePattern::Monthly(MonthlySelector::WeeksOfMonth([1].into()))
        );
    }

    #[test]
    fn deserialize_rejects_both_monthly_selectors() {
        let yaml = "frequency: monthly\nstart_date: 2025-01-08\ndays_of_month: [8]\nweeks_of_month: [1]\n";
        let err = serde_yaml::from_str::<RecurrenceRule>(yaml).unwrap_err();
        assert!(err.to_string().contains("cannot select days of month and weeks of month"));
    }

    #[test]
    fn deserialize_rejects_zero_interval() {
        let yaml = "frequency: daily\nevery: 0\nstart_date: 2025-01-08\n";
        assert!(serde_yaml::from_str::<RecurrenceRule>(yaml).is_err());
    }

    #[test]
    fn weekly_rule_survives_json_round_trip() {
        let rule = RecurrenceRule::weekly(
            date(2025, 3, 3),
            2,
            [Weekday::Fri, Weekday::Mon].into_iter().collect(),
        )
        .unwrap();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["frequency"], "weekly");
        assert_eq!(json["repeat_on"], serde_json::json!(["Mon", "Fri"]));
        let back: RecurrenceRule = serde_json::from_value(json).unwrap();
        assert_eq!(back, rule);
    }
}
