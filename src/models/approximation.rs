//! Polynomial least-squares approximation.
//!
//! Fits `value ≈ Σ c_i · time^i` to the original series and regenerates a
//! derived series at every integer time between the original bounds.

use std::sync::Arc;

use crate::core::{DataPoint, Series};
use crate::error::{Result, TrendError};
use crate::models::traits::{attached_pair, Model};
use crate::utils::polyfit::{horner, polyfit};

/// Coefficients with a magnitude below this are omitted from formulas.
const FORMULA_EPSILON: f64 = 1e-10;

/// Rendered by [`Approximation::formula`] before the first compute.
pub const FORMULA_NOT_COMPUTED: &str = "not computed";

/// Formatting options for [`Approximation::formula_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaStyle {
    /// Decimal places for coefficients (trailing zeros are trimmed).
    pub precision: usize,
    /// Name of the independent variable.
    pub variable: String,
}

impl Default for FormulaStyle {
    fn default() -> Self {
        Self {
            precision: 4,
            variable: "x".to_string(),
        }
    }
}

/// Least-squares polynomial approximation of a series.
#[derive(Debug, Clone)]
pub struct Approximation {
    name: String,
    description: String,
    degree: usize,
    original: Option<Arc<Series>>,
    coefficients: Option<Vec<f64>>,
    derived: Option<Series>,
}

/// Builder for Approximation.
#[derive(Debug, Clone, Default)]
pub struct ApproximationBuilder {
    name: Option<String>,
    description: Option<String>,
    degree: Option<usize>,
    source: Option<Arc<Series>>,
}

impl ApproximationBuilder {
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

    /// Polynomial degree, at least 1. Defaults to 1.
    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = Some(degree);
        self
    }

    /// Attach the original series; `build` then computes immediately.
    pub fn source(mut self, series: Arc<Series>) -> Self {
        self.source = Some(series);
        self
    }

    pub fn build(self) -> Result<Approximation> {
        let degree = self.degree.unwrap_or(1);
        validate_degree(degree)?;

        let mut model = Approximation {
            name: self.name.unwrap_or_else(|| "Approximation".to_string()),
            description: self
                .description
                .unwrap_or_else(|| default_description(degree)),
            degree,
            original: self.source,
            coefficients: None,
            derived: None,
        };
        if model.original.is_some() {
            model.compute()?;
        }
        Ok(model)
    }
}

fn validate_degree(degree: usize) -> Result<()> {
    if degree < 1 {
        return Err(TrendError::InvalidArgument(format!(
            "degree must be at least 1, got {degree}"
        )));
    }
    Ok(())
}

fn default_description(degree: usize) -> String {
    format!("Least-squares polynomial approximation of degree {degree}")
}

impl Approximation {
    /// Create and compute an approximation of `original` with `degree`.
    pub fn new(original: Arc<Series>, degree: usize) -> Result<Self> {
        Self::builder().degree(degree).source(original).build()
    }

    /// Create a builder for more complex configuration.
    pub fn builder() -> ApproximationBuilder {
        ApproximationBuilder::new()
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Change the degree. Takes effect on the next compute.
    pub fn set_degree(&mut self, degree: usize) -> Result<()> {
        validate_degree(degree)?;
        self.degree = degree;
        Ok(())
    }

    /// Fitted coefficients in ascending power order.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    /// Evaluate the fitted polynomial at any real time.
    pub fn evaluate(&self, time: f64) -> Result<f64> {
        let coefficients = self.fitted_coefficients()?;
        Ok(horner(coefficients, time))
    }

    /// Evaluate the polynomial at every integer time in `[start, end]`.
    ///
    /// Not limited to the range the polynomial was fitted on.
    pub fn evaluate_range(&self, start: i64, end: i64) -> Result<Series> {
        let coefficients = self.fitted_coefficients()?;
        if end < start {
            return Err(TrendError::InvalidArgument(format!(
                "end time {end} is before start time {start}"
            )));
        }
        let base = self.original.as_ref().map_or(self.name.as_str(), |s| s.name());
        let name = format!("{base} approximation [{start}..{end}]");
        Series::from_points(name, horner_points(coefficients, start, end))
    }

    /// Render the polynomial with the default [`FormulaStyle`].
    pub fn formula(&self) -> String {
        self.formula_with(&FormulaStyle::default())
    }

    /// Render the polynomial, highest power first.
    ///
    /// Terms with `|c| < 1e-10`, or that round to zero at the chosen
    /// precision, are skipped; `"0"` is returned when all are.
    pub fn formula_with(&self, style: &FormulaStyle) -> String {
        match &self.coefficients {
            Some(coefficients) => render_formula(coefficients, style),
            None => FORMULA_NOT_COMPUTED.to_string(),
        }
    }

    fn fitted_coefficients(&self) -> Result<&[f64]> {
        self.coefficients.as_deref().ok_or_else(|| {
            TrendError::InvalidState("approximation has not been computed".to_string())
        })
    }
}

fn horner_points(coefficients: &[f64], start: i64, end: i64) -> impl Iterator<Item = DataPoint> + '_ {
    (start..=end).map(move |t| DataPoint::new(t, horner(coefficients, t as f64)))
}

fn format_number(value: f64, precision: usize) -> String {
    let mut text = format!("{value:.precision$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    text
}

fn render_formula(coefficients: &[f64], style: &FormulaStyle) -> String {
    let mut out = String::new();

    for (power, &c) in coefficients.iter().enumerate().rev() {
        if c.abs() < FORMULA_EPSILON {
            continue;
        }

        let magnitude = format_number(c.abs(), style.precision);
        if magnitude == "0" {
            continue;
        }
        let negative = c < 0.0;
        if out.is_empty() {
            if negative {
                out.push('-');
            }
        } else {
            out.push_str(if negative { " - " } else { " + " });
        }

        let term = match power {
            0 => magnitude,
            1 if magnitude == "1" => style.variable.clone(),
            1 => format!("{magnitude}{}", style.variable),
            _ if magnitude == "1" => format!("{}^{power}", style.variable),
            _ => format!("{magnitude}{}^{power}", style.variable),
        };
        out.push_str(&term);
    }

    if out.is_empty() {
        "0".to_string()
    } else {
        out
    }
}

impl Model for Approximation {
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

        let mut points = original.points().to_vec();
        points.sort_by_key(|p| p.time);
        let x: Vec<f64> = points.iter().map(|p| p.time as f64).collect();
        let y: Vec<f64> = points.iter().map(|p| p.value).collect();

        let coefficients = polyfit(&x, &y, self.degree)?;

        let (start, end) = (original.min_time(), original.max_time());
        let derived = Series::from_points(
            format!("{} approximation (degree {})", original.name(), self.degree),
            horner_points(&coefficients, start, end),
        )?
        .with_description(self.description.clone());

        tracing::debug!(
            model = %self.name,
            degree = self.degree,
            points_in = original.len(),
            points_out = derived.len(),
            "approximation computed"
        );

        self.coefficients = Some(coefficients);
        self.derived = Some(derived);
        Ok(())
    }

    fn aligned_values(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        let (original, derived) = attached_pair(self.original(), self.derived())?;

        // Derived covers every integer from its min time, so look up by offset.
        let start = derived.min_time();
        let derived_points = derived.points();
        let mut actual = Vec::with_capacity(original.len());
        let mut predicted = Vec::with_capacity(original.len());
        for point in original.iter() {
            let value = point
                .time
                .checked_sub(start)
                .and_then(|offset| usize::try_from(offset).ok())
                .and_then(|i| derived_points.get(i))
                .filter(|p| p.time == point.time)
                .map(|p| p.value)
                .or_else(|| derived.value_at(point.time))
                .ok_or_else(|| {
                    TrendError::InvalidState(format!(
                        "derived series has no value at time {}; recompute the model",
                        point.time
                    ))
                })?;
            actual.push(point.value);
            predicted.push(value);
        }
        Ok((actual, predicted))
    }
}
