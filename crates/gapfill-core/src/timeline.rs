//! Time-axis regularization.
//!
//! Real series usually arrive as (timestamp, value) pairs with holes in the
//! time axis rather than explicit sentinels. These functions align such
//! observations onto a fixed or calendar-month grid, inserting the gap
//! sentinel at every missing stamp so the result feeds straight into the
//! fillers.

use crate::error::{GapFillError, Result};
use crate::locate::is_gap;
use chrono::{Datelike, Months, NaiveDateTime, Timelike};

/// Convert microseconds since epoch to NaiveDateTime.
fn micros_to_datetime(micros: i64) -> NaiveDateTime {
    let secs = micros / 1_000_000;
    let nsecs = ((micros % 1_000_000) * 1000) as u32;
    chrono::DateTime::from_timestamp(secs, nsecs)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

/// Convert NaiveDateTime to microseconds since epoch.
fn datetime_to_micros(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_micros()
}

/// Get the start of month for a given datetime (first day at midnight).
fn start_of_month(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_day(1)
        .unwrap_or(dt)
        .with_hour(0)
        .unwrap_or(dt)
        .with_minute(0)
        .unwrap_or(dt)
        .with_second(0)
        .unwrap_or(dt)
        .with_nanosecond(0)
        .unwrap_or(dt)
}

/// Align observations onto a fixed-frequency grid.
///
/// Sorts the (date, value) pairs by timestamp and inserts `gap_value` rows
/// wherever consecutive observations are more than one `frequency_micros`
/// step apart. The returned series is ready for the fillers.
///
/// # Errors
/// * [`GapFillError::InvalidInput`] on length mismatch, or if `gap_value`
///   collides with a real observation.
/// * [`GapFillError::InvalidParameter`] if `frequency_micros` is not
///   positive.
pub fn regularize(
    dates: &[i64],
    values: &[f64],
    frequency_micros: i64,
    gap_value: f64,
) -> Result<(Vec<i64>, Vec<f64>)> {
    if frequency_micros <= 0 {
        return Err(GapFillError::InvalidParameter {
            param: "frequency_micros".to_string(),
            value: frequency_micros.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    let pairs = prepare_pairs(dates, values, gap_value)?;
    if pairs.len() < 2 {
        return Ok(pairs.into_iter().unzip());
    }

    let mut result_dates = Vec::new();
    let mut result_values = Vec::new();

    result_dates.push(pairs[0].0);
    result_values.push(pairs[0].1);

    for i in 1..pairs.len() {
        let (prev_date, _) = pairs[i - 1];
        let (curr_date, curr_val) = pairs[i];

        let gap = curr_date - prev_date;
        let expected_steps = gap / frequency_micros;

        // Insert missing timestamps
        for step in 1..expected_steps {
            result_dates.push(prev_date + step * frequency_micros);
            result_values.push(gap_value);
        }

        result_dates.push(curr_date);
        result_values.push(curr_val);
    }

    Ok((result_dates, result_values))
}

/// Align observations onto a calendar-month grid.
///
/// Like [`regularize`], but steps by calendar months, so grids survive the
/// unequal month lengths that break fixed-interval arithmetic.
pub fn regularize_monthly(
    dates: &[i64],
    values: &[f64],
    gap_value: f64,
) -> Result<(Vec<i64>, Vec<f64>)> {
    let pairs = prepare_pairs(dates, values, gap_value)?;
    if pairs.len() < 2 {
        return Ok(pairs.into_iter().unzip());
    }

    let mut result_dates = Vec::new();
    let mut result_values = Vec::new();

    result_dates.push(pairs[0].0);
    result_values.push(pairs[0].1);

    for i in 1..pairs.len() {
        let prev_dt = micros_to_datetime(pairs[i - 1].0);
        let curr_dt = micros_to_datetime(pairs[i].0);
        let (curr_date, curr_val) = pairs[i];

        let prev_months = prev_dt.year() * 12 + prev_dt.month() as i32;
        let curr_months = curr_dt.year() * 12 + curr_dt.month() as i32;
        let month_diff = curr_months - prev_months;

        // Insert missing months, anchored at the start of the previous month
        if month_diff > 1 {
            let prev_start = start_of_month(prev_dt);
            for step in 1..month_diff {
                if let Some(missing_dt) = prev_start.checked_add_months(Months::new(step as u32)) {
                    result_dates.push(datetime_to_micros(missing_dt));
                    result_values.push(gap_value);
                }
            }
        }

        result_dates.push(curr_date);
        result_values.push(curr_val);
    }

    Ok((result_dates, result_values))
}

/// Detect the sampling frequency of a time series in microseconds.
///
/// Returns the most common positive difference between consecutive sorted
/// timestamps.
pub fn detect_frequency(dates: &[i64]) -> Result<i64> {
    if dates.len() < 2 {
        return Err(GapFillError::InsufficientData {
            needed: 2,
            got: dates.len(),
        });
    }

    let mut sorted_dates = dates.to_vec();
    sorted_dates.sort_unstable();

    let diffs: Vec<i64> = sorted_dates
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&d| d > 0)
        .collect();

    if diffs.is_empty() {
        return Err(GapFillError::InvalidInput(
            "Could not detect frequency: all timestamps are identical".to_string(),
        ));
    }

    // Most common difference wins
    let mut counts = std::collections::HashMap::new();
    for d in &diffs {
        *counts.entry(*d).or_insert(0) += 1;
    }

    let mode = counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(diff, _)| diff)
        .expect("diffs checked non-empty above");

    Ok(mode)
}

/// Validate lengths and the sentinel contract, then sort by date.
fn prepare_pairs(dates: &[i64], values: &[f64], gap_value: f64) -> Result<Vec<(i64, f64)>> {
    if dates.len() != values.len() {
        return Err(GapFillError::InvalidInput(format!(
            "Dates and values must have the same length: {} vs {}",
            dates.len(),
            values.len()
        )));
    }
    if values.iter().any(|&v| is_gap(v, gap_value)) {
        return Err(GapFillError::InvalidInput(format!(
            "Gap sentinel {} collides with an observed value",
            gap_value
        )));
    }

    let mut pairs: Vec<(i64, f64)> = dates.iter().copied().zip(values.iter().copied()).collect();
    pairs.sort_by_key(|(d, _)| *d);
    Ok(pairs)
}
