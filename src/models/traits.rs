//! Model trait defining the common interface for all derived-series models.

use std::sync::Arc;

use crate::core::Series;
use crate::error::{Result, TrendError};
use crate::models::{Approximation, MaFiltration};
use crate::utils::metrics::{self, FitMetrics};

/// Common interface for every model variant.
///
/// A model borrows an original [`Series`] (shared through `Arc`) and owns the
/// derived series it builds on [`compute`](Model::compute). The derived series
/// is not kept in sync with later changes to the original; call `compute`
/// again to refresh it.
///
/// This trait is object-safe and can be used with `Box<dyn Model>`.
pub trait Model {
    /// Display name of the model.
    fn name(&self) -> &str;

    /// Human-readable description, including parameters.
    fn description(&self) -> &str;

    /// The original series, if one is attached.
    fn original(&self) -> Option<&Series>;

    /// The derived series, absent until the first successful compute.
    fn derived(&self) -> Option<&Series>;

    /// Replace the original series. Does not recompute.
    fn set_original(&mut self, series: Arc<Series>);

    /// Rebuild the derived series from the original and current parameters.
    ///
    /// On failure the previously derived series is left untouched.
    fn compute(&mut self) -> Result<()>;

    /// Original and derived values aligned point-for-point.
    fn aligned_values(&self) -> Result<(Vec<f64>, Vec<f64>)>;

    /// Check if the model has been computed.
    fn is_computed(&self) -> bool {
        self.derived().is_some()
    }

    /// Mean squared error of the derived series against the original.
    fn mean_squared_error(&self) -> Result<f64> {
        let (actual, predicted) = self.aligned_values()?;
        metrics::mean_squared_error(&actual, &predicted)
    }

    /// Coefficient of determination of the derived series.
    fn r_squared(&self) -> Result<f64> {
        let (actual, predicted) = self.aligned_values()?;
        metrics::r_squared(&actual, &predicted)
    }

    /// All fit metrics at once.
    fn fit_metrics(&self) -> Result<FitMetrics> {
        let (actual, predicted) = self.aligned_values()?;
        metrics::evaluate_fit(&actual, &predicted)
    }
}

/// Type alias for boxed model trait objects.
///
/// `Send` so a caller may run `compute` on a worker thread.
pub type BoxedModel = Box<dyn Model + Send>;

/// Both series required for fit evaluation, or `InvalidState`.
pub(crate) fn attached_pair<'a>(
    original: Option<&'a Series>,
    derived: Option<&'a Series>,
) -> Result<(&'a Series, &'a Series)> {
    let original = original
        .ok_or_else(|| TrendError::InvalidState("original series is absent".to_string()))?;
    let derived = derived.ok_or_else(|| {
        TrendError::InvalidState("model has not been computed".to_string())
    })?;
    Ok((original, derived))
}

/// Model variant and parameters, usable as a factory.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use anofox_trend::core::Series;
/// use anofox_trend::models::{Model, ModelKind};
///
/// let series = Arc::new(Series::from_values("demo", 1, &[1.0, 2.0, 3.0, 4.0]).unwrap());
/// let model = ModelKind::MovingAverage { window: 2 }.build(series).unwrap();
/// assert_eq!(model.derived().unwrap().len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Least-squares polynomial of the given degree.
    Approximation { degree: usize },
    /// Trailing moving average with the given window size.
    MovingAverage { window: usize },
}

impl ModelKind {
    /// Create and compute a model over `source`.
    pub fn build(&self, source: Arc<Series>) -> Result<BoxedModel> {
        match *self {
            ModelKind::Approximation { degree } => {
                Ok(Box::new(Approximation::new(source, degree)?))
            }
            ModelKind::MovingAverage { window } => {
                Ok(Box::new(MaFiltration::new(source, window)?))
            }
        }
    }

    /// Short label of the variant.
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Approximation { .. } => "Approximation",
            ModelKind::MovingAverage { .. } => "MaFiltration",
        }
    }
}
