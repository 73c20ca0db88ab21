//! Completion tracking
//!
//! Pure functions over a habit's completion history:
//! - `record_completion` - at-most-once-per-day append
//! - `derive_progress` - rolling 30-day progress percentage and current streak
//!
//! History entries are `YYYY-MM-DD` strings in insertion order. Nothing here
//! assumes the history is chronological. Any malformed entry fails the whole
//! operation rather than being skipped.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Number of calendar days in the progress window (today included)
pub const PROGRESS_WINDOW_DAYS: u32 = 30;

/// Date format for history entries
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Completion tracker errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The date is already recorded in the history
    #[error("Habit already completed on {date}")]
    DuplicateCompletion { date: String },

    /// A date is not a valid `YYYY-MM-DD` calendar date
    #[error("Malformed date: {value:?}")]
    MalformedDate { value: String },
}

/// Progress metrics for the window ending today
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Percentage of window days completed, rounded half-up
    pub progress_percent: u32,
    /// Consecutive completed days ending today
    pub streak: u32,
    /// Distinct history entries inside the window, in history order
    pub completed_in_window: Vec<String>,
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// chrono tolerates padding spaces, signed years and single-digit fields,
/// so the value must also round-trip through `format_date` unchanged.
pub fn parse_date(value: &str) -> Result<NaiveDate, CompletionError> {
    let malformed = || CompletionError::MalformedDate {
        value: value.to_string(),
    };
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| malformed())?;
    if format_date(date) != value {
        return Err(malformed());
    }
    Ok(date)
}

/// Format a date as a history key
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Validate every history entry, returning them as a set of dates
fn parse_history(history: &[String]) -> Result<HashSet<NaiveDate>, CompletionError> {
    history.iter().map(String::as_str).map(parse_date).collect()
}

/// Record a completion for `today`.
///
/// Returns the history with `today` appended and `accepted = true`. If `today`
/// is already present the history is left untouched and
/// `CompletionError::DuplicateCompletion` is returned.
pub fn record_completion(
    history: &[String],
    today: &str,
) -> Result<(Vec<String>, bool), CompletionError> {
    let day = parse_date(today)?;
    let recorded = parse_history(history)?;

    if recorded.contains(&day) {
        return Err(CompletionError::DuplicateCompletion {
            date: today.to_string(),
        });
    }

    let mut updated = history.to_vec();
    updated.push(format_date(day));
    Ok((updated, true))
}

/// The 30 window keys, newest first: `today, today-1, ..., today-29`
pub fn window_keys(today: NaiveDate) -> Vec<String> {
    (0..PROGRESS_WINDOW_DAYS)
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(format_date)
        .collect()
}

/// Derive progress percentage, streak and in-window completions.
pub fn derive_progress(history: &[String], today: &str) -> Result<Progress, CompletionError> {
    let today = parse_date(today)?;
    let recorded = parse_history(history)?;

    let window: HashSet<String> = window_keys(today).into_iter().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let completed_in_window: Vec<String> = history
        .iter()
        .map(String::as_str)
        .filter(|entry| window.contains(*entry) && seen.insert(*entry))
        .map(str::to_string)
        .collect();

    let completed = completed_in_window.len() as u32;
    let progress_percent = (100 * completed + PROGRESS_WINDOW_DAYS / 2) / PROGRESS_WINDOW_DAYS;

    let mut streak = 0u32;
    let mut day = Some(today);
    while let Some(current) = day {
        if !recorded.contains(&current) {
            break;
        }
        streak += 1;
        day = current.pred_opt();
    }

    Ok(Progress {
        progress_percent,
        streak,
        completed_in_window,
    })
}
