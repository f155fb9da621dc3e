//! Forecasting collaborators for model-based gap filling.
//!
//! The directional filler only needs "fit on a context, forecast N steps",
//! so that capability is the whole interface. A handful of models ship with
//! the crate; anything else can be plugged in by implementing [`Forecaster`].

use crate::error::{GapFillError, Result};

use anofox_forecast::models::exponential::{ETSSpec, ETS as ETSModel};
use anofox_forecast::prelude::Forecaster as _;
use anofox_regression::prelude::*;

/// Capability interface for the forecasting collaborator.
///
/// Implementations are re-fit from scratch on every call and must not
/// retain state between invocations.
pub trait Forecaster {
    /// Fit on `train` and forecast `horizon` steps past its end.
    ///
    /// `max_window_size` bounds how much trailing history the model trains
    /// on. The returned vector must contain exactly `horizon` values.
    fn fit_forecast(&self, train: &[f64], horizon: usize, max_window_size: usize)
        -> Result<Vec<f64>>;
}

/// At most the trailing `max_window_size` points of the training slice.
fn training_window(train: &[f64], max_window_size: usize) -> &[f64] {
    let w = max_window_size.max(1).min(train.len());
    &train[train.len() - w..]
}

/// Repeats the last observed value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveForecaster;

impl Forecaster for NaiveForecaster {
    fn fit_forecast(
        &self,
        train: &[f64],
        horizon: usize,
        _max_window_size: usize,
    ) -> Result<Vec<f64>> {
        let last = *train
            .last()
            .ok_or(GapFillError::InsufficientData { needed: 1, got: 0 })?;
        Ok(vec![last; horizon])
    }
}

/// Random walk with drift: extends the average step of the training window.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftForecaster;

impl Forecaster for DriftForecaster {
    fn fit_forecast(
        &self,
        train: &[f64],
        horizon: usize,
        max_window_size: usize,
    ) -> Result<Vec<f64>> {
        if train.is_empty() {
            return Err(GapFillError::InsufficientData { needed: 2, got: 0 });
        }
        let window = training_window(train, max_window_size);
        if window.len() < 2 {
            return Err(GapFillError::InsufficientData {
                needed: 2,
                got: window.len(),
            });
        }

        let n = window.len();
        let last = window[n - 1];
        let drift = (last - window[0]) / (n - 1) as f64;

        Ok((1..=horizon).map(|h| last + drift * h as f64).collect())
    }
}

/// Simple exponential smoothing: forecasts the final smoothed level.
#[derive(Debug, Clone, Copy)]
pub struct SesForecaster {
    /// Smoothing factor in (0, 1].
    pub alpha: f64,
}

impl Default for SesForecaster {
    fn default() -> Self {
        Self { alpha: 0.3 }
    }
}

impl Forecaster for SesForecaster {
    fn fit_forecast(
        &self,
        train: &[f64],
        horizon: usize,
        max_window_size: usize,
    ) -> Result<Vec<f64>> {
        if !(0.0..=1.0).contains(&self.alpha) || self.alpha == 0.0 {
            return Err(GapFillError::InvalidParameter {
                param: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        if train.is_empty() {
            return Err(GapFillError::InsufficientData { needed: 1, got: 0 });
        }

        let window = training_window(train, max_window_size);
        let mut level = window[0];
        for &v in window.iter().skip(1) {
            level = self.alpha * v + (1.0 - self.alpha) * level;
        }

        Ok(vec![level; horizon])
    }
}

/// Autoregression on lagged values, fit with ordinary least squares.
///
/// A design matrix of `order` lag columns is built over the training
/// window and fit through [`OlsRegressor`]; multi-step forecasts are
/// produced recursively, feeding each prediction back in as the newest lag.
/// The order is reduced when the window is too short to support it.
#[derive(Debug, Clone, Copy)]
pub struct ArForecaster {
    /// Number of lagged values used as regressors.
    pub order: usize,
}

impl Default for ArForecaster {
    fn default() -> Self {
        Self { order: 3 }
    }
}

impl Forecaster for ArForecaster {
    fn fit_forecast(
        &self,
        train: &[f64],
        horizon: usize,
        max_window_size: usize,
    ) -> Result<Vec<f64>> {
        if self.order == 0 {
            return Err(GapFillError::InvalidParameter {
                param: "order".to_string(),
                value: "0".to_string(),
                reason: "at least one lag is required".to_string(),
            });
        }

        let window = training_window(train, max_window_size);
        if window.len() < 2 {
            return Err(GapFillError::InsufficientData {
                needed: 2,
                got: window.len(),
            });
        }
        let p = self.order.min(window.len() - 1);

        // Lag matrix: row i holds window[i..i + p], target is window[i + p]
        let n_rows = window.len() - p;
        let x_mat = faer::Mat::from_fn(n_rows, p, |i, j| window[i + j]);
        let y_col = faer::Col::from_fn(n_rows, |i| window[i + p]);

        let fitted = OlsRegressor::builder()
            .with_intercept(true)
            .build()
            .fit(&x_mat, &y_col)
            .map_err(|e| {
                GapFillError::ComputationError(format!("Autoregressive fit failed: {}", e))
            })?;

        let intercept = fitted.intercept().unwrap_or(0.0);
        let betas = fitted.coefficients();

        let mut history = window.to_vec();
        let mut point = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let m = history.len();
            let mut next = intercept;
            for j in 0..p {
                next += betas[j] * history[m - p + j];
            }
            point.push(next);
            history.push(next);
        }

        Ok(point)
    }
}

/// Adapter over the `anofox-forecast` ETS state-space model.
#[derive(Debug, Clone, Copy)]
pub struct EtsForecaster {
    spec: ETSSpec,
    seasonal_period: usize,
}

impl EtsForecaster {
    /// Build from an ETS notation string such as `"AAN"` or `"AAdN"`.
    pub fn from_notation(notation: &str, seasonal_period: usize) -> Result<Self> {
        let spec = ETSSpec::from_notation(notation).map_err(|e| GapFillError::InvalidParameter {
            param: "notation".to_string(),
            value: notation.to_string(),
            reason: format!("{}", e),
        })?;
        Ok(Self {
            spec,
            seasonal_period: seasonal_period.max(1),
        })
    }
}

impl Forecaster for EtsForecaster {
    fn fit_forecast(
        &self,
        train: &[f64],
        horizon: usize,
        max_window_size: usize,
    ) -> Result<Vec<f64>> {
        use anofox_forecast::core::TimeSeriesBuilder;

        if train.is_empty() {
            return Err(GapFillError::InsufficientData { needed: 3, got: 0 });
        }
        let window = training_window(train, max_window_size);
        if window.len() < 3 {
            return Err(GapFillError::InsufficientData {
                needed: 3,
                got: window.len(),
            });
        }

        let time_series = TimeSeriesBuilder::new()
            .values(window.to_vec())
            .build()
            .map_err(|e| {
                GapFillError::ComputationError(format!("Failed to build TimeSeries: {}", e))
            })?;

        let mut model = ETSModel::new(self.spec, self.seasonal_period);
        model
            .fit(&time_series)
            .map_err(|e| GapFillError::ComputationError(format!("Failed to fit ETS model: {}", e)))?;

        let forecast = model.predict(horizon).map_err(|e| {
            GapFillError::ComputationError(format!("Failed to generate ETS forecasts: {}", e))
        })?;

        // Univariate series: point forecasts live in the first dimension
        let point = forecast.point().first().cloned().unwrap_or_default();
        if point.len() != horizon {
            return Err(GapFillError::ForecastLength {
                expected: horizon,
                got: point.len(),
            });
        }

        Ok(point)
    }
}
