//! Goodness-of-fit metrics shared by every model variant.

use crate::error::{Result, TrendError};

/// Fit quality of a derived series against its original.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// R-squared (coefficient of determination)
    pub r_squared: f64,
    /// Number of aligned points compared
    pub points: usize,
}

fn check_aligned(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(TrendError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(TrendError::EmptySeries);
    }
    Ok(())
}

fn residual_sum_of_squares(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum()
}

/// Mean of squared differences between equal-length arrays.
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_aligned(actual, predicted)?;
    Ok(residual_sum_of_squares(actual, predicted) / actual.len() as f64)
}

/// Square root of [`mean_squared_error`].
pub fn root_mean_squared_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    mean_squared_error(actual, predicted).map(f64::sqrt)
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// `SS_tot` is taken against the mean of `actual`. When `actual` is constant
/// up to rounding (`SS_tot <= n · ε · max(mean², 1)`) the result is `1.0` if
/// `SS_res` is within the same tolerance and `NaN` otherwise.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    check_aligned(actual, predicted)?;

    let n = actual.len() as f64;
    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res = residual_sum_of_squares(actual, predicted);

    let tolerance = n * f64::EPSILON * mean_actual.powi(2).max(1.0);
    if ss_tot <= tolerance {
        return Ok(if ss_res <= tolerance { 1.0 } else { f64::NAN });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Compute all fit metrics in one pass over the aligned arrays.
pub fn evaluate_fit(actual: &[f64], predicted: &[f64]) -> Result<FitMetrics> {
    let mse = mean_squared_error(actual, predicted)?;
    Ok(FitMetrics {
        mse,
        rmse: mse.sqrt(),
        r_squared: r_squared(actual, predicted)?,
        points: actual.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_prediction() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = actual.clone();

        let metrics = evaluate_fit(&actual, &predicted).unwrap();

        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_relative_eq!(metrics.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(metrics.points, 5);
    }

    #[test]
    fn known_values() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = vec![1.5, 2.5, 2.5, 4.5, 4.5];
        // Errors: 0.5 each, SS_res = 1.25, SS_tot = 10

        assert_relative_eq!(
            mean_squared_error(&actual, &predicted).unwrap(),
            0.25,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            root_mean_squared_error(&actual, &predicted).unwrap(),
            0.5,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            r_squared(&actual, &predicted).unwrap(),
            0.875,
            epsilon = 1e-12
        );
    }

    #[test]
    fn mse_is_symmetric_but_r_squared_is_not() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![2.0, 2.0, 2.0, 5.0];

        assert_relative_eq!(
            mean_squared_error(&a, &b).unwrap(),
            mean_squared_error(&b, &a).unwrap()
        );
        let forward = r_squared(&a, &b).unwrap();
        let backward = r_squared(&b, &a).unwrap();
        assert!((forward - backward).abs() > 1e-6);
    }

    #[test]
    fn r_squared_negative_for_poor_model() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = vec![5.0, 4.0, 3.0, 2.0, 1.0];

        assert!(r_squared(&actual, &predicted).unwrap() < 0.0);
    }

    #[test]
    fn r_squared_constant_actual() {
        let actual = vec![3.0, 3.0, 3.0];
        assert_eq!(r_squared(&actual, &[3.0, 3.0, 3.0]).unwrap(), 1.0);
        assert!(r_squared(&actual, &[3.0, 3.5, 3.0]).unwrap().is_nan());
    }

    #[test]
    fn r_squared_constant_actual_with_rounding_noise() {
        // Residuals at rounding level must not turn into NaN or a negative score.
        let level = 123.456;
        let actual = vec![level; 10];
        let predicted: Vec<f64> = (0..10)
            .map(|i| level + if i % 2 == 0 { 1e-14 } else { -1e-14 })
            .collect();
        assert_eq!(r_squared(&actual, &predicted).unwrap(), 1.0);

        let nearly_flat = vec![0.1, 0.1 + 1e-17, 0.1, 0.1 - 1e-17];
        assert_eq!(r_squared(&nearly_flat, &[0.1; 4]).unwrap(), 1.0);

        assert!(r_squared(&actual, &vec![level + 0.5; 10]).unwrap().is_nan());
    }

    #[test]
    fn dimension_mismatch() {
        let result = mean_squared_error(&[1.0, 2.0, 3.0], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(TrendError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
        assert!(r_squared(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn empty_arrays() {
        assert!(matches!(
            mean_squared_error(&[], &[]),
            Err(TrendError::EmptySeries)
        ));
    }
}
