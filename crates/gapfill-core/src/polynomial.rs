//! Local polynomial regression over nearest known neighbors.

use crate::error::{GapFillError, Result};
use crate::locate::{find_gap_runs, is_gap, known_indices, nearest_known_indices};

use anofox_regression::prelude::*;

/// Restore missing values one gap index at a time.
///
/// For each gap index in ascending order, the `n_neighbors` known indices
/// nearest by absolute distance are selected, a least-squares polynomial of
/// `degree` is fit through the (index, value) pairs, and the polynomial is
/// evaluated at the gap index. The known-index set is recomputed from the
/// working copy after every fill, so earlier fills in the same call are
/// visible to later ones.
///
/// When fewer than `n_neighbors` known points are available, all of them
/// are used; the degree is clamped so the fit stays determined.
///
/// # Errors
/// * [`GapFillError::InvalidParameter`] if `n_neighbors` is zero.
/// * [`GapFillError::InsufficientData`] if no known points exist.
pub fn local_poly_fill(
    values: &[f64],
    gap_value: f64,
    degree: usize,
    n_neighbors: usize,
) -> Result<Vec<f64>> {
    validate_neighbors(n_neighbors)?;

    let gaps: Vec<usize> = (0..values.len())
        .filter(|&i| is_gap(values[i], gap_value))
        .collect();

    let mut result = values.to_vec();
    for gap_index in gaps {
        let known = known_indices(&result, gap_value);
        if known.is_empty() {
            return Err(GapFillError::InsufficientData { needed: 1, got: 0 });
        }

        let nearest = nearest_known_indices(&known, gap_index, n_neighbors);
        let xs: Vec<f64> = nearest.iter().map(|&i| i as f64).collect();
        let ys: Vec<f64> = nearest.iter().map(|&i| result[i]).collect();

        let coefs = polyfit(&xs, &ys, degree.min(nearest.len() - 1))?;
        result[gap_index] = polyval(&coefs, gap_index as f64);
    }

    Ok(result)
}

/// Restore missing values one gap run at a time.
///
/// For each run, the `n_neighbors` known indices nearest to the run's
/// integer midpoint are selected from the known set of the *original*
/// sequence (fills of earlier runs are not considered), one polynomial of
/// `degree` is fit, and it is evaluated at every index of the run.
///
/// # Errors
/// * [`GapFillError::InvalidParameter`] if `n_neighbors` is zero.
/// * [`GapFillError::InsufficientData`] if no known points exist.
pub fn batch_poly_fill(
    values: &[f64],
    gap_value: f64,
    degree: usize,
    n_neighbors: usize,
) -> Result<Vec<f64>> {
    validate_neighbors(n_neighbors)?;

    let runs = find_gap_runs(values, gap_value);
    let mut result = values.to_vec();
    if runs.is_empty() {
        return Ok(result);
    }

    // Neighbor selection works off the known set captured before any run
    // is filled, unlike the point-mode rescan.
    let known = known_indices(values, gap_value);
    if known.is_empty() {
        return Err(GapFillError::InsufficientData { needed: 1, got: 0 });
    }

    for run in &runs {
        let nearest = nearest_known_indices(&known, run.midpoint(), n_neighbors);
        let xs: Vec<f64> = nearest.iter().map(|&i| i as f64).collect();
        let ys: Vec<f64> = nearest.iter().map(|&i| values[i]).collect();

        let coefs = polyfit(&xs, &ys, degree.min(nearest.len() - 1))?;
        for i in run.indices() {
            result[i] = polyval(&coefs, i as f64);
        }
    }

    Ok(result)
}

fn validate_neighbors(n_neighbors: usize) -> Result<()> {
    if n_neighbors == 0 {
        return Err(GapFillError::InvalidParameter {
            param: "n_neighbors".to_string(),
            value: "0".to_string(),
            reason: "at least one known neighbor is required".to_string(),
        });
    }
    Ok(())
}

/// Fit a least-squares polynomial through the (x, y) pairs.
///
/// Returns coefficients in ascending powers, `[c0, c1, .., c_degree]`.
/// Callers must pass `degree < xs.len()` so the system is determined.
fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> Result<Vec<f64>> {
    let n = xs.len();

    // A degree-0 fit is the plain mean; no design matrix needed
    if degree == 0 {
        return Ok(vec![ys.iter().sum::<f64>() / n as f64]);
    }

    // Vandermonde design matrix: n rows x degree columns, intercept handled
    // by the regressor
    let x_mat = faer::Mat::from_fn(n, degree, |i, j| xs[i].powi(j as i32 + 1));
    let y_col = faer::Col::from_fn(n, |i| ys[i]);

    let fitted = OlsRegressor::builder()
        .with_intercept(true)
        .build()
        .fit(&x_mat, &y_col)
        .map_err(|e| GapFillError::ComputationError(format!("Polynomial fit failed: {}", e)))?;

    let mut coefs = vec![fitted.intercept().unwrap_or(0.0)];
    let betas = fitted.coefficients();
    for i in 0..betas.nrows() {
        coefs.push(betas[i]);
    }

    Ok(coefs)
}

/// Evaluate a polynomial given ascending-power coefficients.
fn polyval(coefs: &[f64], x: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const GAP: f64 = -100.0;

    #[test]
    fn test_polyval_horner() {
        // 2 + 3x + x^2 at x = 2
        assert_relative_eq!(polyval(&[2.0, 3.0, 1.0], 2.0), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_mode_nearest_neighbor_reduction() {
        // degree 0 with a single neighbor copies the strictly closer known
        // value
        let result = local_poly_fill(&[4.0, GAP, GAP, 7.0], GAP, 0, 1).unwrap();
        assert_relative_eq!(result[1], 4.0, epsilon = 1e-12);

        let result = local_poly_fill(&[1.0, 2.0, 3.5, GAP], GAP, 0, 1).unwrap();
        assert_relative_eq!(result[3], 3.5, epsilon = 1e-12);
    }

    #[test]
    fn test_point_mode_sees_earlier_fills() {
        // After index 1 is filled with 1.0, it is the nearest neighbor of
        // index 2 (equidistant with index 3, lower index wins), so the
        // second fill copies the first instead of the far known value.
        let result = local_poly_fill(&[1.0, GAP, GAP, 10.0], GAP, 0, 1).unwrap();
        assert_relative_eq!(result[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(result[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_mode_linear_data_degree_one() {
        let result = local_poly_fill(&[0.0, 1.0, GAP, 3.0, 4.0], GAP, 1, 4).unwrap();
        assert_relative_eq!(result[2], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn test_batch_mode_fills_whole_run() {
        let result = batch_poly_fill(&[0.0, 1.0, GAP, GAP, 4.0, 5.0], GAP, 1, 4).unwrap();
        assert_relative_eq!(result[2], 2.0, epsilon = 1e-8);
        assert_relative_eq!(result[3], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn test_batch_mode_ignores_earlier_fills() {
        // Run at index 1 and run at 3..=6. For the second run's midpoint
        // (4), the nearest two known indices of the original sequence are 2
        // and 7; had the first run's fill been visible, index 1 would have
        // displaced index 7.
        let values = vec![0.0, GAP, 0.0, GAP, GAP, GAP, GAP, 8.0];
        let result = batch_poly_fill(&values, GAP, 0, 2).unwrap();
        for i in 3..=6 {
            assert_relative_eq!(result[i], 4.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_neighbor_count_capped_at_available() {
        // Only two known points, K = 10: uses both, degree clamps to 1
        let result = local_poly_fill(&[2.0, GAP, 4.0], GAP, 3, 10).unwrap();
        assert_relative_eq!(result[1], 3.0, epsilon = 1e-8);
    }

    #[test]
    fn test_zero_known_points() {
        let err = local_poly_fill(&[GAP, GAP], GAP, 1, 3).unwrap_err();
        assert!(matches!(err, GapFillError::InsufficientData { .. }));

        let err = batch_poly_fill(&[GAP, GAP], GAP, 1, 3).unwrap_err();
        assert!(matches!(err, GapFillError::InsufficientData { .. }));
    }

    #[test]
    fn test_zero_neighbors_rejected() {
        let err = local_poly_fill(&[1.0, GAP, 3.0], GAP, 1, 0).unwrap_err();
        assert!(matches!(err, GapFillError::InvalidParameter { .. }));
    }

    #[test]
    fn test_gap_free_input_returned_unchanged() {
        let values = vec![1.0, 2.0, 3.0];
        assert_eq!(local_poly_fill(&values, GAP, 2, 3).unwrap(), values);
        assert_eq!(batch_poly_fill(&values, GAP, 2, 3).unwrap(), values);
    }
}
