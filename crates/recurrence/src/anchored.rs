//! Monthly rules whose selector is read off the anchor date.

use chrono::{Datelike, NaiveDate};

use cadence_core::{ModelError, MonthlySelector, RecurrenceRule};

use crate::calendar::weekday_ordinal_in_month;

/// Monthly rule on the anchor's day of month ("the 8th of every month").
pub fn monthly_on_anchor_day(anchor: NaiveDate, interval: u32) -> Result<RecurrenceRule, ModelError> {
    let day = anchor.day() as u8;
    RecurrenceRule::monthly(anchor, interval, MonthlySelector::days([day])?)
}

/// Monthly rule on the anchor's weekday ordinal ("the 2nd Wednesday").
///
/// The ordinal counts occurrences of the anchor weekday from the start of
/// the month, so July 6 2025 (a Sunday) is the 1st Sunday even though it
/// sits in the second calendar row.
pub fn monthly_on_anchor_weekday(anchor: NaiveDate, interval: u32) -> Result<RecurrenceRule, ModelError> {
    let ordinal = weekday_ordinal_in_month(anchor);
    RecurrenceRule::monthly(anchor, interval, MonthlySelector::weeks([ordinal])?)
}
