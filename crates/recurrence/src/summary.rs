//! Human-readable rule descriptions, e.g. "every 2 months on the 2nd Wednesday".

use chrono::{Datelike, Month, Weekday};

use cadence_core::{MonthlySelector, RecurrencePattern, RecurrenceRule};

/// English ordinal for `n`: 1st, 2nd, 3rd, 4th, 11th, 21st, ...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Describe a rule in one line.
///
/// Week-of-month selectors are shown 1-based ("2nd Saturday" for ordinal 1).
pub fn describe(rule: &RecurrenceRule) -> String {
    let every = |unit: &str| match rule.interval() {
        1 => format!("every {unit}"),
        n => format!("every {n} {unit}s"),
    };

    match rule.pattern() {
        RecurrencePattern::Daily => every("day"),
        RecurrencePattern::Weekly(days) => {
            let names: Vec<&str> = days.iter().map(weekday_name).collect();
            format!("{} on {}", every("week"), join_words(&names))
        }
        RecurrencePattern::Monthly(MonthlySelector::DaysOfMonth(days)) => {
            let days: Vec<String> = days.iter().map(|&d| ordinal(u32::from(d))).collect();
            format!("{} on the {}", every("month"), join_words(&days))
        }
        RecurrencePattern::Monthly(MonthlySelector::WeeksOfMonth(weeks)) => {
            let weeks: Vec<String> = weeks.iter().map(|&w| ordinal(u32::from(w) + 1)).collect();
            format!(
                "{} on the {} {}",
                every("month"),
                join_words(&weeks),
                weekday_name(rule.anchor_weekday())
            )
        }
        RecurrencePattern::Yearly => {
            let anchor = rule.anchor();
            let month = u8::try_from(anchor.month())
                .ok()
                .and_then(|m| Month::try_from(m).ok())
                .map(|m| m.name())
                .unwrap_or("?");
            format!("{} on {} {}", every("year"), month, anchor.day())
        }
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn join_words<S: AsRef<str>>(words: &[S]) -> String {
    match words {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|w| w.as_ref()).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}
