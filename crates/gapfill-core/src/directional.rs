//! Model-based gap filling with directional forecasts.
//!
//! Each gap run is predicted from its left context (forward pass), from its
//! reversed right context (inverse pass), or both, with the two estimates
//! blended by linear distance weights so each forecast dominates near its
//! own context.

use crate::error::{GapFillError, Result};
use crate::forecaster::Forecaster;
use crate::locate::{find_gap_runs, GapRun};

/// Fill every gap run using forward and inverse forecasts.
///
/// Runs are processed in position order over a working copy, so the forward
/// context of a later run includes the reconstructions of earlier runs. The
/// training context of each pass is truncated to the `max_window_size`
/// points nearest the gap.
///
/// A run touching a sequence boundary has only one usable context; the
/// available direction is then used unweighted.
///
/// # Errors
/// * [`GapFillError::InvalidParameter`] if `max_window_size` is zero.
/// * [`GapFillError::InsufficientContext`] if a run has no known values on
///   either side.
/// * [`GapFillError::ForecastLength`] if the forecaster violates its
///   length contract.
pub fn forward_inverse_fill<F: Forecaster>(
    values: &[f64],
    gap_value: f64,
    forecaster: &F,
    max_window_size: usize,
) -> Result<Vec<f64>> {
    validate_window(max_window_size)?;

    let runs = find_gap_runs(values, gap_value);
    let mut result = values.to_vec();

    for (batch_index, run) in runs.iter().enumerate() {
        let forward = {
            let context = forward_context(&result, run, max_window_size);
            if context.is_empty() {
                None
            } else {
                Some(fit_forecast_checked(forecaster, context, run.len, max_window_size)?)
            }
        };

        let inverse = {
            let context = inverse_context(&result, &runs, batch_index, max_window_size);
            if context.is_empty() {
                None
            } else {
                let reversed: Vec<f64> = context.iter().rev().copied().collect();
                let mut predicted =
                    fit_forecast_checked(forecaster, &reversed, run.len, max_window_size)?;
                predicted.reverse();
                Some(predicted)
            }
        };

        let filled = match (forward, inverse) {
            (Some(f), Some(i)) => blend_directional(&f, &i),
            (Some(f), None) => f,
            (None, Some(i)) => i,
            (None, None) => {
                return Err(GapFillError::InsufficientContext {
                    start: run.start,
                    end: run.end(),
                })
            }
        };

        for (offset, value) in filled.iter().enumerate() {
            result[run.start + offset] = *value;
        }
    }

    Ok(result)
}

/// Fill every gap run using forward forecasts only.
///
/// # Errors
/// * [`GapFillError::InvalidParameter`] if `max_window_size` is zero.
/// * [`GapFillError::InsufficientContext`] if a run has no known values
///   before it.
/// * [`GapFillError::ForecastLength`] if the forecaster violates its
///   length contract.
pub fn forward_fill<F: Forecaster>(
    values: &[f64],
    gap_value: f64,
    forecaster: &F,
    max_window_size: usize,
) -> Result<Vec<f64>> {
    validate_window(max_window_size)?;

    let runs = find_gap_runs(values, gap_value);
    let mut result = values.to_vec();

    for run in &runs {
        let context = forward_context(&result, run, max_window_size);
        if context.is_empty() {
            return Err(GapFillError::InsufficientContext {
                start: run.start,
                end: run.end(),
            });
        }

        let predicted = fit_forecast_checked(forecaster, context, run.len, max_window_size)?;
        for (offset, value) in predicted.iter().enumerate() {
            result[run.start + offset] = *value;
        }
    }

    Ok(result)
}

fn validate_window(max_window_size: usize) -> Result<()> {
    if max_window_size == 0 {
        return Err(GapFillError::InvalidParameter {
            param: "max_window_size".to_string(),
            value: "0".to_string(),
            reason: "training context must allow at least one point".to_string(),
        });
    }
    Ok(())
}

/// Everything strictly before the run, truncated to the trailing
/// `max_window_size` points.
fn forward_context<'a>(values: &'a [f64], run: &GapRun, max_window_size: usize) -> &'a [f64] {
    let context = &values[..run.start];
    &context[context.len().saturating_sub(max_window_size)..]
}

/// Everything strictly after the run up to the next run's start (or the
/// sequence end for the last run), truncated to the leading
/// `max_window_size` points, i.e. those nearest the gap.
fn inverse_context<'a>(
    values: &'a [f64],
    runs: &[GapRun],
    batch_index: usize,
    max_window_size: usize,
) -> &'a [f64] {
    let run = &runs[batch_index];
    let context_end = runs
        .get(batch_index + 1)
        .map_or(values.len(), |next| next.start);
    let context = &values[run.end() + 1..context_end];
    &context[..context.len().min(max_window_size)]
}

fn fit_forecast_checked<F: Forecaster>(
    forecaster: &F,
    context: &[f64],
    horizon: usize,
    max_window_size: usize,
) -> Result<Vec<f64>> {
    let predicted = forecaster.fit_forecast(context, horizon, max_window_size)?;
    if predicted.len() != horizon {
        return Err(GapFillError::ForecastLength {
            expected: horizon,
            got: predicted.len(),
        });
    }
    Ok(predicted)
}

/// Per-position weighted average of forward and inverse predictions.
///
/// Forward weights descend from the run length to 1, inverse weights ascend
/// from 1 to the run length.
fn blend_directional(forward: &[f64], inverse: &[f64]) -> Vec<f64> {
    let len = forward.len();
    (0..len)
        .map(|i| {
            let w_fwd = (len - i) as f64;
            let w_inv = (i + 1) as f64;
            (forward[i] * w_fwd + inverse[i] * w_inv) / (w_fwd + w_inv)
        })
        .collect()
}
