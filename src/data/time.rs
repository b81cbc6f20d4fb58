//! Conversion of calendar labels into the integer time ordinates used by [`Task`](crate::core::Task).

use crate::core::Time;
use thiserror::Error;

/// Distance between two consecutive days. Larger than the minutes in a day, so
/// intervals on different days never overlap.
pub const DAY_MULTIPLIER: Time = 10_000;

/// Reasons a time label is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("time `{0}` is not in HH:MM format")]
    Format(String),
    #[error("time `{0}` is out of range")]
    Range(String),
    #[error("unknown day `{0}`")]
    Day(String),
}

/// Converts an `HH:MM` label into minutes since midnight.
///
/// # Errors
/// - If the label is not two colon-separated numbers.
/// - If the hour is above 24 or the minute above 59.
pub fn time_to_minutes(label: &str) -> Result<Time, LabelError> {
    let format = || LabelError::Format(label.to_owned());

    let (hours, minutes) = label.trim().split_once(':').ok_or_else(format)?;
    let hours: Time = hours.trim().parse().map_err(|_| format())?;
    let minutes: Time = minutes.trim().parse().map_err(|_| format())?;

    if !(0..=24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(LabelError::Range(label.to_owned()));
    }

    Ok(hours * 60 + minutes)
}

/// Returns the 1-based position of a weekday, Monday first.
///
/// # Errors
/// - If the name is not an English weekday.
pub fn day_index(day: &str) -> Result<Time, LabelError> {
    const DAYS: [&str; 7] = [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];

    let day = day.trim();
    DAYS.iter()
        .zip(1..)
        .find(|(name, _)| name.eq_ignore_ascii_case(day))
        .map(|(_, index)| index)
        .ok_or_else(|| LabelError::Day(day.to_owned()))
}

/// Converts a weekday and an `HH:MM` label into a single ordinate:
/// `day_index * DAY_MULTIPLIER + minutes`.
///
/// # Errors
/// - If either label is invalid.
pub fn day_and_time_to_ordinal(day: &str, time: &str) -> Result<Time, LabelError> {
    Ok(day_index(day)? * DAY_MULTIPLIER + time_to_minutes(time)?)
}
