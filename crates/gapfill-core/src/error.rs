//! Error types for gap-filling operations.

use thiserror::Error;

/// Result type for gap-filling operations.
pub type Result<T> = std::result::Result<T, GapFillError>;

/// Error types for gap-filling operations.
#[derive(Error, Debug)]
pub enum GapFillError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },

    #[error("Insufficient data: need at least {needed} known observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Gap at index {index} lies outside the interpolation domain [{first}, {last}]")]
    OutOfRange {
        index: usize,
        first: usize,
        last: usize,
    },

    #[error("Gap run at indices {start}..={end} has no usable context on either side")]
    InsufficientContext { start: usize, end: usize },

    #[error("Forecaster returned {got} values, expected {expected}")]
    ForecastLength { expected: usize, got: usize },

    #[error("Computation error: {0}")]
    ComputationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GapFillError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(
            format!("{}", err),
            "Insufficient data: need at least 2 known observations, got 1"
        );

        let err = GapFillError::OutOfRange {
            index: 0,
            first: 1,
            last: 9,
        };
        assert_eq!(
            format!("{}", err),
            "Gap at index 0 lies outside the interpolation domain [1, 9]"
        );

        let err = GapFillError::InsufficientContext { start: 0, end: 4 };
        assert_eq!(
            format!("{}", err),
            "Gap run at indices 0..=4 has no usable context on either side"
        );

        let err = GapFillError::ForecastLength {
            expected: 3,
            got: 2,
        };
        assert_eq!(format!("{}", err), "Forecaster returned 2 values, expected 3");
    }

    #[test]
    fn test_error_construction() {
        let err = GapFillError::InvalidParameter {
            param: "n_neighbors".into(),
            value: "0".into(),
            reason: "must be positive".into(),
        };
        if let GapFillError::InvalidParameter { param, value, reason } = err {
            assert_eq!(param, "n_neighbors");
            assert_eq!(value, "0");
            assert_eq!(reason, "must be positive");
        } else {
            panic!("Expected InvalidParameter variant");
        }
    }
}
