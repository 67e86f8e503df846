//! Least-squares polynomial regression and Horner evaluation.
//!
//! The fit solves the Vandermonde system `V c ≈ y` with Householder QR.
//! Columns are equilibrated to unit norm before factoring, which keeps
//! the problem well scaled when time indices are large.

use crate::error::{Result, TrendError};

/// Relative threshold below which a diagonal entry of R counts as zero.
const RANK_TOLERANCE: f64 = 1e-12;

/// Fit `degree + 1` coefficients `c` minimizing `Σ (y_i - Σ_j c_j x_i^j)^2`.
///
/// Coefficients are returned in ascending power order.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(TrendError::DimensionMismatch {
            expected: x.len(),
            got: y.len(),
        });
    }
    if x.is_empty() {
        return Err(TrendError::EmptySeries);
    }

    let num_params = degree + 1;
    let distinct = count_distinct(x);
    if distinct < num_params {
        return Err(TrendError::InsufficientData {
            needed: num_params,
            got: distinct,
        });
    }

    // Column-major Vandermonde matrix: columns[j][i] = x_i^j
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(num_params);
    let mut power = vec![1.0; x.len()];
    for _ in 0..num_params {
        columns.push(power.clone());
        for (p, xi) in power.iter_mut().zip(x) {
            *p *= xi;
        }
    }

    let scales: Vec<f64> = columns
        .iter()
        .map(|col| col.iter().map(|v| v * v).sum::<f64>().sqrt())
        .collect();
    for (col, &s) in columns.iter_mut().zip(&scales) {
        if s == 0.0 || !s.is_finite() {
            return Err(TrendError::ComputationError(
                "design matrix column is degenerate".to_string(),
            ));
        }
        for v in col.iter_mut() {
            *v /= s;
        }
    }

    let scaled = solve_least_squares(columns, y.to_vec()).ok_or_else(|| {
        TrendError::ComputationError("least-squares system is rank deficient".to_string())
    })?;

    tracing::trace!(degree, points = x.len(), "polynomial least-squares solved");

    Ok(scaled.iter().zip(&scales).map(|(c, s)| c / s).collect())
}

/// Evaluate a polynomial (ascending coefficients) at `x` by Horner's method.
pub fn horner(coefficients: &[f64], x: f64) -> f64 {
    match coefficients.split_last() {
        None => 0.0,
        Some((&highest, rest)) => rest.iter().rev().fold(highest, |acc, &c| acc * x + c),
    }
}

fn count_distinct(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Solve the overdetermined system `A x ≈ b` via Householder QR.
///
/// `a` is column-major with `m` rows per column, `m >= n`.
fn solve_least_squares(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = a.len();
    let m = b.len();
    if n == 0 || m < n || a.iter().any(|col| col.len() != m) {
        return None;
    }

    let mut diag = vec![0.0; n];

    for k in 0..n {
        let norm = a[k][k..].iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            return None;
        }
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };

        let mut v: Vec<f64> = a[k][k..].to_vec();
        v[0] -= alpha;
        let v_norm2: f64 = v.iter().map(|x| x * x).sum();

        diag[k] = alpha;
        if v_norm2 == 0.0 {
            continue;
        }

        for col in a.iter_mut().skip(k + 1) {
            reflect(&v, v_norm2, &mut col[k..]);
        }
        reflect(&v, v_norm2, &mut b[k..]);
    }

    let max_diag = diag.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
    if diag.iter().any(|d| d.abs() <= RANK_TOLERANCE * max_diag) {
        return None;
    }

    // Back substitution on R (upper triangle stored in a[j][k], j > k)
    let mut x = vec![0.0; n];
    for k in (0..n).rev() {
        let mut sum = b[k];
        for j in (k + 1)..n {
            sum -= a[j][k] * x[j];
        }
        x[k] = sum / diag[k];
    }

    Some(x)
}

/// Apply `H = I - 2 v v^T / (v^T v)` to `target` in place.
fn reflect(v: &[f64], v_norm2: f64, target: &mut [f64]) {
    let dot: f64 = v.iter().zip(target.iter()).map(|(a, b)| a * b).sum();
    let factor = 2.0 * dot / v_norm2;
    for (t, vi) in target.iter_mut().zip(v) {
        *t -= factor * vi;
    }
}
