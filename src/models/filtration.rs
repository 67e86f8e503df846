//! Moving-average filtration.
//!
//! Smooths a series with a fixed trailing window. The derived series has
//! `n - window + 1` points and starts at `min_time + window - 1`, so it ends
//! aligned with the original range.

use std::sync::Arc;

use crate::core::{offset_time, time_overflow, DataPoint, Series};
use crate::error::{Result, TrendError};
use crate::models::traits::{attached_pair, Model};

/// Moving-average filtration of a series.
#[derive(Debug, Clone)]
pub struct MaFiltration {
    name: String,
    description: String,
    window: usize,
    original: Option<Arc<Series>>,
    derived: Option<Series>,
}

/// Builder for MaFiltration.
#[derive(Debug, Clone, Default)]
pub struct MaFiltrationBuilder {
    name: Option<String>,
    description: Option<String>,
    window: Option<usize>,
    source: Option<Arc<Series>>,
}

impl MaFiltrationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Window size, at least 1. Defaults to 1.
    pub fn window(mut self, window: usize) -> Self {
        self.window = Some(window);
        self
    }

    /// Attach the original series; `build` then computes immediately.
    pub fn source(mut self, series: Arc<Series>) -> Self {
        self.source = Some(series);
        self
    }

    pub fn build(self) -> Result<MaFiltration> {
        let window = self.window.unwrap_or(1);
        validate_window(window)?;

        let mut model = MaFiltration {
            name: self.name.unwrap_or_else(|| "MaFiltration".to_string()),
            description: self
                .description
                .unwrap_or_else(|| format!("Moving average with window size {window}")),
            window,
            original: self.source,
            derived: None,
        };
        if model.original.is_some() {
            model.compute()?;
        }
        Ok(model)
    }
}

fn validate_window(window: usize) -> Result<()> {
    if window < 1 {
        return Err(TrendError::InvalidArgument(format!(
            "window size must be at least 1, got {window}"
        )));
    }
    Ok(())
}

/// Mean of every run of `window` consecutive values.
fn window_means(values: &[f64], window: usize) -> Vec<f64> {
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

impl MaFiltration {
    /// Create and compute a moving average of `original` over `window` points.
    pub fn new(original: Arc<Series>, window: usize) -> Result<Self> {
        Self::builder().window(window).source(original).build()
    }

    /// Create a builder for more complex configuration.
    pub fn builder() -> MaFiltrationBuilder {
        MaFiltrationBuilder::new()
    }

    pub fn window_size(&self) -> usize {
        self.window
    }

    /// Change the window size. Takes effect on the next compute.
    pub fn set_window_size(&mut self, window: usize) -> Result<()> {
        validate_window(window)?;
        self.window = window;
        Ok(())
    }
}

impl Model for MaFiltration {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn original(&self) -> Option<&Series> {
        self.original.as_deref()
    }

    fn derived(&self) -> Option<&Series> {
        self.derived.as_ref()
    }

    fn set_original(&mut self, series: Arc<Series>) {
        self.original = Some(series);
    }

    fn compute(&mut self) -> Result<()> {
        let original = self
            .original
            .as_deref()
            .ok_or_else(|| TrendError::InvalidState("original series is absent".to_string()))?;
        if original.is_empty() {
            return Err(TrendError::EmptySeries);
        }

        let size = original.len();
        if self.window > size {
            return Err(TrendError::WindowTooLarge {
                window: self.window,
                len: size,
            });
        }

        // Values in stored order, not re-sorted by time.
        let means = window_means(&original.values(), self.window);

        // size - (size - window) + (min_time - 1), without leaving i64
        let min_time = original.min_time();
        let start = offset_time(min_time, self.window - 1)
            .ok_or_else(|| time_overflow(min_time, self.window - 1))?;
        let last = means.len() - 1;
        if offset_time(start, last).is_none() {
            return Err(time_overflow(start, last));
        }

        let derived = Series::from_points(
            format!("{} moving average (window {})", original.name(), self.window),
            means
                .iter()
                .enumerate()
                .map(|(i, &mean)| DataPoint::new(start + i as i64, mean)),
        )?
        .with_description(self.description.clone());

        tracing::debug!(
            model = %self.name,
            window = self.window,
            points_in = original.len(),
            points_out = derived.len(),
            start,
            "moving average computed"
        );

        self.derived = Some(derived);
        Ok(())
    }

    fn aligned_values(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        let (original, derived) = attached_pair(self.original(), self.derived())?;

        let actual: Vec<f64> = original
            .range(derived.min_time(), derived.max_time())
            .iter()
            .map(|p| p.value)
            .collect();
        let predicted = derived.values();

        if actual.len() != predicted.len() {
            return Err(TrendError::DimensionMismatch {
                expected: predicted.len(),
                got: actual.len(),
            });
        }
        Ok((actual, predicted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear(n: usize, start: i64) -> Arc<Series> {
        let values: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        Arc::new(Series::from_values("linear", start, &values).unwrap())
    }

    #[test]
    fn window_three_over_five_points() {
        let model = MaFiltration::new(linear(5, 1), 3).unwrap();
        let derived = model.derived().unwrap();

        assert_eq!(derived.len(), 3);
        assert_eq!(derived.times(), vec![3, 4, 5]);
        assert_eq!(derived.values(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn start_follows_original_offset() {
        let model = MaFiltration::new(linear(6, 10), 2).unwrap();
        let derived = model.derived().unwrap();
        assert_eq!(derived.min_time(), 11);
        assert_eq!(derived.max_time(), 15);
    }

    #[test]
    fn window_one_reproduces_original() {
        let source = linear(4, 0);
        let model = MaFiltration::new(Arc::clone(&source), 1).unwrap();
        assert_eq!(model.derived().unwrap().points(), source.points());
        assert_eq!(model.mean_squared_error().unwrap(), 0.0);
        assert_relative_eq!(model.r_squared().unwrap(), 1.0);
    }

    #[test]
    fn full_window_yields_single_mean() {
        let model = MaFiltration::new(linear(4, 1), 4).unwrap();
        let derived = model.derived().unwrap();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived.times(), vec![4]);
        assert_relative_eq!(derived.values()[0], 2.5);
    }

    #[test]
    fn values_are_taken_in_stored_order() {
        let source = Arc::new(
            Series::from_points("shuffled", [(1, 10.0), (3, 30.0), (2, 20.0)]).unwrap(),
        );
        let model = MaFiltration::new(source, 2).unwrap();
        assert_eq!(model.derived().unwrap().values(), vec![20.0, 25.0]);
    }

    #[test]
    fn invalid_parameters() {
        assert!(matches!(
            MaFiltration::new(linear(5, 1), 0),
            Err(TrendError::InvalidArgument(_))
        ));
        assert!(matches!(
            MaFiltration::new(linear(3, 1), 4),
            Err(TrendError::WindowTooLarge { window: 4, len: 3 })
        ));
        assert!(matches!(
            MaFiltration::new(Arc::new(Series::new("e").unwrap()), 1),
            Err(TrendError::EmptySeries)
        ));
    }

    #[test]
    fn failed_recompute_keeps_previous_result() {
        let mut model = MaFiltration::new(linear(5, 1), 2).unwrap();
        let before = model.derived().cloned();

        model.set_window_size(9).unwrap();
        assert!(model.compute().unwrap_err().is_degenerate());
        assert_eq!(model.derived().cloned(), before);
    }

    #[test]
    fn fit_uses_trailing_range_of_original() {
        let source = Arc::new(
            Series::from_values("s", 1, &[1.0, 3.0, 2.0, 4.0, 3.0]).unwrap(),
        );
        let model = MaFiltration::new(source, 2).unwrap();

        let (actual, predicted) = model.aligned_values().unwrap();
        assert_eq!(actual, vec![3.0, 2.0, 4.0, 3.0]);
        assert_eq!(predicted, vec![2.0, 2.5, 3.0, 3.5]);

        // Squared errors: 1, 0.25, 1, 0.25
        assert_relative_eq!(model.mean_squared_error().unwrap(), 0.625, epsilon = 1e-12);
    }

    #[test]
    fn non_contiguous_alignment_is_reported() {
        let source = Arc::new(
            Series::from_points("gaps", [(1, 1.0), (5, 2.0), (9, 3.0)]).unwrap(),
        );
        let model = MaFiltration::new(source, 2).unwrap();
        // Derived at times 2..=3; original has nothing there.
        assert_eq!(model.derived().unwrap().times(), vec![2, 3]);
        assert!(matches!(
            model.mean_squared_error(),
            Err(TrendError::DimensionMismatch { expected: 2, got: 0 })
        ));
    }

    #[test]
    fn constant_series_is_a_perfect_fit() {
        for (n, level, window) in [(5, 5.0, 2), (7, 0.1, 3), (10, 123.456, 4), (10, 1e6, 3)] {
            let model = MaFiltration::new(
                Arc::new(Series::from_values("flat", 1, &vec![level; n]).unwrap()),
                window,
            )
            .unwrap();
            assert_eq!(model.r_squared().unwrap(), 1.0);
        }
    }

    #[test]
    fn extreme_time_bounds() {
        let low = Arc::new(
            Series::from_points("low", [(i64::MIN, 1.0), (i64::MIN + 1, 3.0)]).unwrap(),
        );
        let model = MaFiltration::new(low, 2).unwrap();
        assert_eq!(model.derived().unwrap().times(), vec![i64::MIN + 1]);
        assert_relative_eq!(model.derived().unwrap().values()[0], 2.0);

        let high = Arc::new(
            Series::from_points("high", [(i64::MAX, 1.0), (i64::MAX, 2.0), (i64::MAX, 3.0)])
                .unwrap(),
        );
        assert!(matches!(
            MaFiltration::new(Arc::clone(&high), 2),
            Err(TrendError::InvalidArgument(_))
        ));
        let single = MaFiltration::new(
            Arc::new(Series::from_points("one", [(i64::MAX, 4.0)]).unwrap()),
            1,
        )
        .unwrap();
        assert_eq!(single.derived().unwrap().times(), vec![i64::MAX]);
    }

    #[test]
    fn unattached_model() {
        let mut model = MaFiltration::builder().window(3).name("smooth").build().unwrap();
        assert_eq!(model.name(), "smooth");
        assert!(matches!(model.compute(), Err(TrendError::InvalidState(_))));
        assert!(matches!(model.r_squared(), Err(TrendError::InvalidState(_))));

        model.set_original(linear(5, 1));
        model.compute().unwrap();
        assert_eq!(model.derived().unwrap().len(), 3);
    }
}
