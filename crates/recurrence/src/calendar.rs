//! Pure calendar helpers: month lengths, nth weekday, clamped days.

use chrono::{Datelike, NaiveDate, Weekday};

/// Number of days in `month` (1-12) of `year`, leap-year aware.
///
/// Returns 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Date of the `n`-th (0-based) `weekday` in the month.
///
/// `None` when the month has fewer than `n + 1` such weekdays, which is the
/// usual outcome for `n = 4`.
pub fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let day = 1 + offset + 7 * u32::from(n);
    if day > days_in_month(year, month) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `min(day, days_in_month(year, month))`.
pub fn clamped_day_of_month(year: i32, month: u32, day: u32) -> u32 {
    day.min(days_in_month(year, month))
}

/// 0-based ordinal of the date's weekday within its month.
///
/// July 12 2025 is the second Saturday of July, so this returns 1.
pub fn weekday_ordinal_in_month(date: NaiveDate) -> u8 {
    ((date.day() - 1) / 7) as u8
}

/// Shift (`year`, `month`) forward by `offset` months, carrying into years.
pub fn add_months(year: i32, month: u32, offset: u32) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(offset);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = (index.rem_euclid(12) + 1) as u32;
    Some((year, month))
}

/// Whole months from (`from_year`, `from_month`) to (`to_year`, `to_month`).
pub fn months_between(from_year: i32, from_month: u32, to_year: i32, to_month: u32) -> i64 {
    (i64::from(to_year) * 12 + i64::from(to_month)) - (i64::from(from_year) * 12 + i64::from(from_month))
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.weekday().num_days_from_monday()))
}
