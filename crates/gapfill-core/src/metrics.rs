//! Validation metrics for reconstructed series.
//!
//! When ground truth is available for the gapped positions, these metrics
//! quantify how well a filler recovered them: MAE, RMSE, median absolute
//! error, and a zero-guarded MAPE variant.

use crate::error::{GapFillError, Result};
use crate::locate::is_gap;
use statrs::statistics::{Data, Median};

/// Default substitute for true values equal to zero in [`mape`].
pub const DEFAULT_MAPE_EPSILON: f64 = 0.001;

/// Calculates Mean Absolute Error between actual and reconstructed values.
///
/// # Formula
/// MAE = (1/n) * Σ|actual_i - predicted_i|
pub fn mae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Root Mean Squared Error between actual and reconstructed
/// values.
///
/// # Formula
/// RMSE = √[(1/n) * Σ(actual_i - predicted_i)²]
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok((sum / actual.len() as f64).sqrt())
}

/// Calculates the median of absolute errors, robust to outlier positions.
pub fn median_ae(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let abs_errors: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .collect();
    Ok(Data::new(abs_errors).median())
}

/// Calculates Mean Absolute Percentage Error with a zero guard.
///
/// True values exactly equal to zero are replaced by `epsilon` before the
/// division, keeping the result finite. This deliberately understates the
/// percentage error at those positions; callers needing the unguarded
/// behavior can filter zeros out beforehand.
///
/// # Formula
/// MAPE = (100/n) * Σ|guard(actual_i) - predicted_i| / |guard(actual_i)|
pub fn mape(actual: &[f64], predicted: &[f64], epsilon: f64) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    if epsilon <= 0.0 || !epsilon.is_finite() {
        return Err(GapFillError::InvalidParameter {
            param: "epsilon".to_string(),
            value: epsilon.to_string(),
            reason: "must be a positive finite number".to_string(),
        });
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &p)| {
            let guarded = if a == 0.0 { epsilon } else { a };
            ((guarded - p) / guarded).abs()
        })
        .sum();
    Ok(sum / actual.len() as f64 * 100.0)
}

/// Summary of reconstruction error over the gapped positions of a series.
#[derive(Debug, Clone)]
pub struct FillReport {
    /// Number of gap positions evaluated.
    pub n_gaps: usize,
    /// Smallest true value inside the gaps.
    pub min_true: f64,
    /// Largest true value inside the gaps.
    pub max_true: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Median absolute error.
    pub median_ae: f64,
    /// Zero-guarded mean absolute percentage error.
    pub mape: f64,
}

/// Compare a reconstructed series against ground truth at gap positions.
///
/// `mask` is the series as it looked before filling; positions where it
/// holds the sentinel are the ones evaluated. All four metrics plus the
/// true-value range are restricted to those positions.
///
/// # Errors
/// * [`GapFillError::InvalidInput`] on length mismatch.
/// * [`GapFillError::InsufficientData`] if the mask contains no gaps.
pub fn evaluate_fill(
    actual: &[f64],
    filled: &[f64],
    mask: &[f64],
    gap_value: f64,
) -> Result<FillReport> {
    if actual.len() != filled.len() || actual.len() != mask.len() {
        return Err(GapFillError::InvalidInput(format!(
            "Actual, filled and mask arrays must have the same length: {} vs {} vs {}",
            actual.len(),
            filled.len(),
            mask.len()
        )));
    }

    let gap_positions: Vec<usize> = (0..mask.len())
        .filter(|&i| is_gap(mask[i], gap_value))
        .collect();
    if gap_positions.is_empty() {
        return Err(GapFillError::InsufficientData { needed: 1, got: 0 });
    }

    let truth: Vec<f64> = gap_positions.iter().map(|&i| actual[i]).collect();
    let predicted: Vec<f64> = gap_positions.iter().map(|&i| filled[i]).collect();

    let min_true = truth.iter().copied().fold(f64::INFINITY, f64::min);
    let max_true = truth.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(FillReport {
        n_gaps: gap_positions.len(),
        min_true,
        max_true,
        mae: mae(&truth, &predicted)?,
        rmse: rmse(&truth, &predicted)?,
        median_ae: median_ae(&truth, &predicted)?,
        mape: mape(&truth, &predicted, DEFAULT_MAPE_EPSILON)?,
    })
}

fn validate_inputs(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(GapFillError::InvalidInput(format!(
            "Actual and predicted arrays must have the same length: {} vs {}",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(GapFillError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mae() {
        let actual = vec![1.0, 2.0, 3.0];
        let predicted = vec![1.5, 2.0, 2.5];
        assert_relative_eq!(mae(&actual, &predicted).unwrap(), 1.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rmse() {
        let actual = vec![1.0, 2.0, 3.0];
        let predicted = vec![1.0, 2.0, 4.0];
        assert_relative_eq!(
            rmse(&actual, &predicted).unwrap(),
            (1.0_f64 / 3.0).sqrt(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_median_ae_robust_to_outlier() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = vec![1.1, 2.1, 3.1, 4.1, 105.0];
        // Absolute errors: [0.1, 0.1, 0.1, 0.1, 100.0]; the median ignores
        // the blown position
        assert_relative_eq!(
            median_ae(&actual, &predicted).unwrap(),
            0.1,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_mape() {
        let actual = vec![100.0, 200.0, 300.0];
        let predicted = vec![110.0, 180.0, 330.0];
        assert_relative_eq!(
            mape(&actual, &predicted, DEFAULT_MAPE_EPSILON).unwrap(),
            10.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_mape_zero_guard_finite() {
        let actual = vec![0.0, 100.0];
        let predicted = vec![0.001, 110.0];
        let result = mape(&actual, &predicted, DEFAULT_MAPE_EPSILON).unwrap();
        assert!(result.is_finite());
        // The zero entry is scored as if the true value were epsilon:
        // |0.001 - 0.001| / 0.001 = 0, leaving only the 10% entry
        assert_relative_eq!(result, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mape_rejects_bad_epsilon() {
        let actual = vec![1.0];
        let predicted = vec![1.0];
        assert!(mape(&actual, &predicted, 0.0).is_err());
        assert!(mape(&actual, &predicted, -0.5).is_err());
    }

    #[test]
    fn test_evaluate_fill_masked_positions_only() {
        const GAP: f64 = -100.0;
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        let mask = vec![1.0, GAP, 3.0, GAP];
        // The filled series is wrong at a known position (index 0), which
        // must not affect the report
        let filled = vec![9.0, 2.5, 3.0, 4.5];

        let report = evaluate_fill(&actual, &filled, &mask, GAP).unwrap();
        assert_eq!(report.n_gaps, 2);
        assert_relative_eq!(report.min_true, 2.0, epsilon = 1e-12);
        assert_relative_eq!(report.max_true, 4.0, epsilon = 1e-12);
        assert_relative_eq!(report.mae, 0.5, epsilon = 1e-9);
        assert_relative_eq!(report.rmse, 0.5, epsilon = 1e-9);
        assert_relative_eq!(report.median_ae, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_evaluate_fill_no_gaps_in_mask() {
        let values = vec![1.0, 2.0];
        let err = evaluate_fill(&values, &values, &values, -100.0).unwrap_err();
        assert!(matches!(err, GapFillError::InsufficientData { .. }));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(mae(&[1.0, 2.0], &[1.0]).is_err());
        assert!(evaluate_fill(&[1.0], &[1.0], &[1.0, 2.0], -100.0).is_err());
    }
}
