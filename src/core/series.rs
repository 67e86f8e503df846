//! Series data structure for indexed observations.

use crate::error::{Result, TrendError};

/// A single observation: integer time index and real value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub time: i64,
    pub value: f64,
}

impl DataPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

impl From<(i64, f64)> for DataPoint {
    fn from((time, value): (i64, f64)) -> Self {
        Self { time, value }
    }
}

/// An ordered, named collection of (time, value) observations.
///
/// Insertion order is preserved. Time values are neither required to be
/// sorted nor unique. Bounds (`min_time`, `max_value`, ...) are `0` for an
/// empty series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    description: Option<String>,
    points: Vec<DataPoint>,
}

impl Series {
    /// Create an empty series. The name must not be blank.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TrendError::InvalidArgument(
                "series name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            description: None,
            points: Vec::new(),
        })
    }

    /// Create a series from an iterator of points, preserving order.
    pub fn from_points<I, P>(name: impl Into<String>, points: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<DataPoint>,
    {
        let mut series = Self::new(name)?;
        series.points = points.into_iter().map(Into::into).collect();
        Ok(series)
    }

    /// Create a series from plain values indexed `start, start + 1, ...`.
    ///
    /// Fails with `InvalidArgument` if the last index does not fit in `i64`.
    pub fn from_values(name: impl Into<String>, start: i64, values: &[f64]) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                offset_time(start, i)
                    .map(|t| DataPoint::new(t, v))
                    .ok_or_else(|| time_overflow(start, i))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_points(name, points)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter()
    }

    /// Time values in stored order.
    pub fn times(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Values in stored order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min_time(&self) -> i64 {
        self.points.iter().map(|p| p.time).min().unwrap_or(0)
    }

    pub fn max_time(&self) -> i64 {
        self.points.iter().map(|p| p.time).max().unwrap_or(0)
    }

    pub fn min_value(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points
            .iter()
            .map(|p| p.value)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Whether stored times form an ascending run with unit steps.
    pub fn is_contiguous(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].time.checked_add(1) == Some(w[1].time))
    }

    /// Append a point. No sorting or deduplication is performed.
    pub fn add_point(&mut self, time: i64, value: f64) {
        self.points.push(DataPoint::new(time, value));
    }

    /// Rewrite every time value to `start, start + 1, ...` in stored order.
    ///
    /// Returns `false` without touching the series when it is empty, its
    /// first point already sits at `start`, or the run would overflow `i64`.
    pub fn reindex(&mut self, start: i64) -> bool {
        match self.points.first() {
            None => false,
            Some(first) if first.time == start => false,
            Some(_) if offset_time(start, self.points.len() - 1).is_none() => false,
            Some(_) => {
                for (i, point) in self.points.iter_mut().enumerate() {
                    point.time = start + i as i64;
                }
                true
            }
        }
    }

    /// Remove all points. Returns `false` if the series was already empty.
    pub fn clear(&mut self) -> bool {
        if self.points.is_empty() {
            return false;
        }
        self.points.clear();
        true
    }

    /// Points with `start <= time <= end`, in stored order.
    pub fn range(&self, start: i64, end: i64) -> Vec<DataPoint> {
        self.points
            .iter()
            .filter(|p| p.time >= start && p.time <= end)
            .copied()
            .collect()
    }

    /// Value of the first point at `time`.
    pub fn value_at(&self, time: i64) -> Option<f64> {
        self.points.iter().find(|p| p.time == time).map(|p| p.value)
    }

    /// Deep copy under a new name; defaults to `"<name> (copy)"`.
    pub fn duplicate(&self, new_name: Option<&str>) -> Series {
        let name = match new_name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => format!("{} (copy)", self.name),
        };
        Series {
            name,
            description: self.description.clone(),
            points: self.points.clone(),
        }
    }
}

/// `start + index`, or `None` on overflow.
pub(crate) fn offset_time(start: i64, index: usize) -> Option<i64> {
    i64::try_from(index)
        .ok()
        .and_then(|i| start.checked_add(i))
}

pub(crate) fn time_overflow(start: i64, index: usize) -> TrendError {
    TrendError::InvalidArgument(format!(
        "time index {start} + {index} is out of range"
    ))
}
