//! Properties every occurrence query must satisfy, checked over whole years
//! of anchor dates rather than single hand-picked scenarios.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Utc, Weekday};

use cadence_core::{MonthlySelector, RecurrenceRule, Reminder};
use cadence_recurrence::calendar::{days_in_month, weekday_ordinal_in_month};
use cadence_recurrence::{monthly_on_anchor_weekday, next_occurrences, OccurrenceGenerator};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn midnight(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap())
}

fn every_day_of(year: i32) -> impl Iterator<Item = NaiveDate> {
    let first = date(year, 1, 1);
    (0..365).map(move |offset| first + Days::new(offset))
}

fn months_apart(a: &DateTime<Utc>, b: &DateTime<Utc>) -> i32 {
    (b.year() * 12 + b.month() as i32) - (a.year() * 12 + a.month() as i32)
}

#[test]
fn week_based_results_keep_anchor_weekday_and_ordinal() {
    let reminder = Reminder::new("r", 9, 0).unwrap();
    for anchor in every_day_of(2025) {
        let rule = monthly_on_anchor_weekday(anchor, 1).unwrap();
        let ordinal = weekday_ordinal_in_month(anchor);
        let occurrences = next_occurrences(&rule, &reminder, 6, &midnight(anchor));

        assert_eq!(occurrences.len(), 6, "anchor {anchor}");
        assert_eq!(occurrences[0].date_naive(), anchor);
        for occurrence in &occurrences {
            assert_eq!(occurrence.weekday(), anchor.weekday(), "anchor {anchor}");
            assert_eq!(
                weekday_ordinal_in_month(occurrence.date_naive()),
                ordinal,
                "anchor {anchor}, occurrence {occurrence}"
            );
        }
    }
}

#[test]
fn day_based_results_clamp_to_month_length() {
    let reminder = Reminder::new("r", 12, 0).unwrap();
    for day in 1..=31u8 {
        let anchor = date(2024, 1, u32::from(day));
        let rule =
            RecurrenceRule::monthly(anchor, 1, MonthlySelector::days([day]).unwrap()).unwrap();
        let occurrences = next_occurrences(&rule, &reminder, 24, &midnight(anchor));

        assert_eq!(occurrences.len(), 24);
        for occurrence in &occurrences {
            let expected = u32::from(day).min(days_in_month(occurrence.year(), occurrence.month()));
            assert_eq!(occurrence.day(), expected, "day {day}, occurrence {occurrence}");
        }
    }
}

#[test]
fn results_are_strictly_ascending_and_after_now() {
    let reminder = Reminder::new("r", 6, 45).unwrap();
    let rules = [
        RecurrenceRule::daily(date(2024, 11, 3), 4).unwrap(),
        RecurrenceRule::weekly(
            date(2024, 11, 3),
            3,
            [Weekday::Sun, Weekday::Tue, Weekday::Thu].into_iter().collect(),
        )
        .unwrap(),
        RecurrenceRule::monthly(date(2024, 11, 3), 1, MonthlySelector::days([31, 30, 1]).unwrap())
            .unwrap(),
        RecurrenceRule::monthly(date(2024, 11, 30), 1, MonthlySelector::weeks([0, 4]).unwrap())
            .unwrap(),
        RecurrenceRule::yearly(date(2024, 2, 29), 1).unwrap(),
    ];

    for start in every_day_of(2025).step_by(17) {
        let now = midnight(start) + Duration::hours(6) + Duration::minutes(45);
        for rule in &rules {
            let occurrences = next_occurrences(rule, &reminder, 8, &now);
            assert!(!occurrences.is_empty());
            assert!(occurrences.iter().all(|o| *o > now), "{rule:?} at {now}");
            assert!(
                occurrences.windows(2).all(|w| w[0] < w[1]),
                "{rule:?} at {now}: {occurrences:?}"
            );
        }
    }
}

#[test]
fn repeated_queries_are_identical() {
    let generator = OccurrenceGenerator::new();
    let rule =
        RecurrenceRule::monthly(date(2025, 5, 29), 1, MonthlySelector::weeks([4]).unwrap()).unwrap();
    let reminder = Reminder::new("r", 10, 0).unwrap();
    let now = midnight(date(2025, 6, 1));

    let first = generator.next_occurrences(&rule, &reminder, 10, &now);
    let second = generator.next_occurrences(&rule, &reminder, 10, &now);
    assert_eq!(first, second);
    assert_eq!(first, next_occurrences(&rule, &reminder, 10, &now));
}

#[test]
fn interval_spacing_per_frequency() {
    let reminder = Reminder::new("r", 8, 0).unwrap();
    let now = midnight(date(2025, 1, 1));

    let daily = RecurrenceRule::daily(date(2025, 1, 1), 5).unwrap();
    let days = next_occurrences(&daily, &reminder, 10, &now);
    assert!(days.windows(2).all(|w| w[1] - w[0] == Duration::days(5)));

    let weekly = RecurrenceRule::weekly(date(2025, 1, 1), 3, [Weekday::Wed].into_iter().collect())
        .unwrap();
    let weeks = next_occurrences(&weekly, &reminder, 10, &now);
    assert!(weeks.windows(2).all(|w| w[1] - w[0] == Duration::weeks(3)));

    let monthly =
        RecurrenceRule::monthly(date(2025, 1, 10), 4, MonthlySelector::days([10]).unwrap()).unwrap();
    let months = next_occurrences(&monthly, &reminder, 10, &now);
    assert!(months.windows(2).all(|w| months_apart(&w[0], &w[1]) == 4));

    let yearly = RecurrenceRule::yearly(date(2025, 6, 1), 2).unwrap();
    let years = next_occurrences(&yearly, &reminder, 5, &now);
    let got: Vec<i32> = years.iter().map(|o| o.year()).collect();
    assert_eq!(got, vec![2025, 2027, 2029, 2031, 2033]);
}

#[test]
fn week_based_interval_spacing_modulo_skipped_months() {
    let reminder = Reminder::new("r", 8, 0).unwrap();
    let rule =
        RecurrenceRule::monthly(date(2025, 5, 29), 2, MonthlySelector::weeks([4]).unwrap()).unwrap();
    let occurrences = next_occurrences(&rule, &reminder, 6, &midnight(date(2025, 5, 1)));

    assert_eq!(occurrences.len(), 6);
    for pair in occurrences.windows(2) {
        let gap = months_apart(&pair[0], &pair[1]);
        assert!(gap > 0 && gap % 2 == 0, "gap {gap} between {} and {}", pair[0], pair[1]);
    }
}
