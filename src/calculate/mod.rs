//! Derived metrics over extracted tournament lists.
//!
//! - History span of one user, in whole months
//! - Comparison window shared by two users

use crate::models::Tournament;

/// Average month length used for span conversion.
pub const AVERAGE_MONTH_DAYS: f64 = 30.44;

/// Upper bound on the comparison window.
pub const MAX_WINDOW_MONTHS: u32 = 12;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Months between a user's earliest and latest dated tournament.
///
/// Rounds up, and is at least 1 once any tournament is dated. Returns 0 when
/// none are.
pub fn calculate_time_range_months(tournaments: &[Tournament]) -> u32 {
    let mut timestamps: Vec<i64> = tournaments
        .iter()
        .filter_map(|t| t.start_time)
        .filter(|&ts| ts > 0)
        .collect();

    if timestamps.is_empty() {
        return 0;
    }
    timestamps.sort_unstable();

    let earliest = timestamps[0];
    let latest = timestamps[timestamps.len() - 1];

    let diff_days = (latest - earliest) as f64 / SECONDS_PER_DAY;
    let months = (diff_days / AVERAGE_MONTH_DAYS).ceil() as u32;

    months.max(1)
}

/// Window shown alongside a comparison: the shorter span, capped at 12.
pub fn comparison_window(mine: u32, theirs: u32) -> u32 {
    mine.min(theirs).min(MAX_WINDOW_MONTHS)
}
