//! Global linear interpolation across known points.

use crate::error::{GapFillError, Result};
use crate::locate::{is_gap, known_indices};

/// Restore missing values with piecewise-linear interpolation.
///
/// Builds a linear interpolant over all known (index, value) pairs and
/// evaluates it at every gap index. The input slice is never mutated; a
/// fully populated copy is returned.
///
/// # Errors
/// * [`GapFillError::InsufficientData`] if fewer than 2 known points exist.
/// * [`GapFillError::OutOfRange`] if a gap lies before the first or after
///   the last known index, since interpolation does not extrapolate.
pub fn linear_interpolation(values: &[f64], gap_value: f64) -> Result<Vec<f64>> {
    let known = known_indices(values, gap_value);
    if known.len() == values.len() {
        return Ok(values.to_vec());
    }
    if known.len() < 2 {
        return Err(GapFillError::InsufficientData {
            needed: 2,
            got: known.len(),
        });
    }

    let first = known[0];
    let last = *known.last().expect("known has at least 2 entries");

    // Leading or trailing gaps would require extrapolation
    for (i, &v) in values.iter().enumerate() {
        if is_gap(v, gap_value) && (i < first || i > last) {
            return Err(GapFillError::OutOfRange { index: i, first, last });
        }
    }

    let mut result = values.to_vec();
    let mut prev_idx = first;
    let mut prev_val = values[first];

    for &i in &known[1..] {
        let v = values[i];
        let gap = i - prev_idx;
        if gap > 1 {
            let slope = (v - prev_val) / gap as f64;
            for j in 1..gap {
                result[prev_idx + j] = prev_val + slope * j as f64;
            }
        }
        prev_idx = i;
        prev_val = v;
    }

    Ok(result)
}
