//! Caller-owned registry of series and models with an explicit state machine.
//!
//! A [`Workspace`] holds the series a front end has loaded and the models
//! computed from them. Long-running activities move the workspace through
//! `Idle -> Busy(activity) -> Idle | Error`, and an error must be
//! acknowledged before the next activity can begin.

use std::fmt;
use std::sync::Arc;

use crate::core::Series;
use crate::error::{Result, TrendError};
use crate::models::{BoxedModel, ModelKind};

/// A long-running workspace activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Loading,
    Calculating,
    Saving,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Activity::Loading => "loading",
            Activity::Calculating => "calculating",
            Activity::Saving => "saving",
        };
        f.write_str(label)
    }
}

/// Current state of a [`Workspace`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkspaceState {
    #[default]
    Idle,
    Busy(Activity),
    /// The last activity failed with this message.
    Error(String),
}

/// Registry of series and models owned by the caller.
#[derive(Default)]
pub struct Workspace {
    series: Vec<Arc<Series>>,
    models: Vec<BoxedModel>,
    state: WorkspaceState,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == WorkspaceState::Idle
    }

    /// `Idle -> Busy(activity)`.
    pub fn begin(&mut self, activity: Activity) -> Result<()> {
        if self.state != WorkspaceState::Idle {
            return Err(TrendError::InvalidState(format!(
                "cannot start {activity} while workspace is {:?}",
                self.state
            )));
        }
        tracing::debug!(%activity, "workspace activity started");
        self.state = WorkspaceState::Busy(activity);
        Ok(())
    }

    /// `Busy -> Idle`.
    pub fn finish(&mut self) -> Result<()> {
        match self.state {
            WorkspaceState::Busy(activity) => {
                tracing::debug!(%activity, "workspace activity finished");
                self.state = WorkspaceState::Idle;
                Ok(())
            }
            _ => Err(TrendError::InvalidState(format!(
                "no activity in progress (state: {:?})",
                self.state
            ))),
        }
    }

    /// `Busy -> Error(message)`.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        match self.state {
            WorkspaceState::Busy(activity) => {
                let message = message.into();
                tracing::warn!(%activity, error = %message, "workspace activity failed");
                self.state = WorkspaceState::Error(message);
                Ok(())
            }
            _ => Err(TrendError::InvalidState(format!(
                "no activity in progress (state: {:?})",
                self.state
            ))),
        }
    }

    /// `Error -> Idle`, returning the acknowledged message.
    pub fn acknowledge(&mut self) -> Result<String> {
        match std::mem::take(&mut self.state) {
            WorkspaceState::Error(message) => Ok(message),
            other => {
                self.state = other;
                Err(TrendError::InvalidState(
                    "no error to acknowledge".to_string(),
                ))
            }
        }
    }

    /// Register a series. Names must be unique within the workspace.
    pub fn add_series(&mut self, series: Series) -> Result<Arc<Series>> {
        if self.series(series.name()).is_some() {
            return Err(TrendError::InvalidArgument(format!(
                "series '{}' already exists",
                series.name()
            )));
        }
        let series = Arc::new(series);
        self.series.push(Arc::clone(&series));
        Ok(series)
    }

    pub fn series(&self, name: &str) -> Option<Arc<Series>> {
        self.series.iter().find(|s| s.name() == name).cloned()
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name())
    }

    /// Remove a series from the registry.
    ///
    /// Models computed from it keep their own handle to its content.
    pub fn remove_series(&mut self, name: &str) -> bool {
        let before = self.series.len();
        self.series.retain(|s| s.name() != name);
        self.series.len() != before
    }

    pub fn models(&self) -> &[BoxedModel] {
        &self.models
    }

    pub fn model(&self, index: usize) -> Option<&BoxedModel> {
        self.models.get(index)
    }

    pub fn model_mut(&mut self, index: usize) -> Option<&mut BoxedModel> {
        self.models.get_mut(index)
    }

    pub fn remove_model(&mut self, index: usize) -> Option<BoxedModel> {
        (index < self.models.len()).then(|| self.models.remove(index))
    }

    /// Run `loader` while `Loading` and register the series it produces.
    pub fn load_with<F>(&mut self, loader: F) -> Result<Arc<Series>>
    where
        F: FnOnce() -> Result<Series>,
    {
        self.begin(Activity::Loading)?;
        let outcome = loader().and_then(|series| self.add_series(series));
        self.settle(outcome)
    }

    /// Build and compute a model over a registered series while `Calculating`.
    ///
    /// Returns the index of the new model.
    pub fn calculate(&mut self, series_name: &str, kind: ModelKind) -> Result<usize> {
        self.begin(Activity::Calculating)?;
        let outcome = self
            .series(series_name)
            .ok_or_else(|| TrendError::InvalidArgument(format!("unknown series '{series_name}'")))
            .and_then(|source| kind.build(source))
            .map(|model| {
                self.models.push(model);
                self.models.len() - 1
            });
        self.settle(outcome)
    }

    /// Hand the registry to `saver` while `Saving`.
    pub fn save_with<F>(&mut self, saver: F) -> Result<()>
    where
        F: FnOnce(&[Arc<Series>], &[BoxedModel]) -> Result<()>,
    {
        self.begin(Activity::Saving)?;
        let outcome = saver(&self.series, &self.models);
        self.settle(outcome)
    }

    fn settle<T>(&mut self, outcome: Result<T>) -> Result<T> {
        match &outcome {
            Ok(_) => self.finish()?,
            Err(err) => self.fail(err.to_string())?,
        }
        outcome
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("series", &self.series.len())
            .field("models", &self.models.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(name: &str, n: usize) -> Series {
        let values: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        Series::from_values(name, 1, &values).unwrap()
    }

    #[test]
    fn transitions() {
        let mut ws = Workspace::new();
        assert!(ws.is_idle());

        ws.begin(Activity::Saving).unwrap();
        assert_eq!(ws.state(), &WorkspaceState::Busy(Activity::Saving));
        assert!(ws.begin(Activity::Loading).is_err());

        ws.fail("disk full").unwrap();
        assert_eq!(ws.state(), &WorkspaceState::Error("disk full".to_string()));
        assert!(ws.begin(Activity::Loading).is_err());
        assert!(ws.finish().is_err());

        assert_eq!(ws.acknowledge().unwrap(), "disk full");
        assert!(ws.is_idle());
        assert!(ws.acknowledge().is_err());
        assert!(ws.is_idle());
    }

    #[test]
    fn finish_and_fail_require_activity() {
        let mut ws = Workspace::new();
        assert!(matches!(ws.finish(), Err(TrendError::InvalidState(_))));
        assert!(matches!(ws.fail("x"), Err(TrendError::InvalidState(_))));
    }

    #[test]
    fn load_and_calculate() {
        let mut ws = Workspace::new();
        ws.load_with(|| Ok(linear("prices", 8))).unwrap();
        assert!(ws.is_idle());
        assert_eq!(ws.series_names().collect::<Vec<_>>(), vec!["prices"]);

        let a = ws
            .calculate("prices", ModelKind::Approximation { degree: 1 })
            .unwrap();
        let m = ws
            .calculate("prices", ModelKind::MovingAverage { window: 3 })
            .unwrap();
        assert_eq!((a, m), (0, 1));
        assert_eq!(ws.models().len(), 2);
        assert_eq!(ws.model(1).unwrap().derived().unwrap().len(), 6);
        assert!(ws.is_idle());
    }

    #[test]
    fn failed_calculation_moves_to_error() {
        let mut ws = Workspace::new();
        ws.add_series(linear("short", 2)).unwrap();

        let err = ws
            .calculate("short", ModelKind::MovingAverage { window: 5 })
            .unwrap_err();
        assert!(err.is_degenerate());
        assert!(matches!(ws.state(), WorkspaceState::Error(_)));
        assert!(ws.models().is_empty());

        ws.acknowledge().unwrap();
        assert!(ws
            .calculate("missing", ModelKind::Approximation { degree: 1 })
            .is_err());
    }

    #[test]
    fn duplicate_series_names_are_rejected() {
        let mut ws = Workspace::new();
        ws.add_series(linear("a", 3)).unwrap();
        assert!(matches!(
            ws.add_series(linear("a", 4)),
            Err(TrendError::InvalidArgument(_))
        ));
        assert!(ws.remove_series("a"));
        assert!(!ws.remove_series("a"));
    }

    #[test]
    fn models_survive_series_removal() {
        let mut ws = Workspace::new();
        ws.add_series(linear("s", 5)).unwrap();
        ws.calculate("s", ModelKind::MovingAverage { window: 2 })
            .unwrap();
        ws.remove_series("s");

        let model = ws.model(0).unwrap();
        assert_eq!(model.original().unwrap().len(), 5);
        assert!(model.mean_squared_error().is_ok());
        assert!(ws.remove_model(0).is_some());
        assert!(ws.remove_model(0).is_none());
    }

    #[test]
    fn save_sees_registry() {
        let mut ws = Workspace::new();
        ws.add_series(linear("s", 4)).unwrap();
        ws.calculate("s", ModelKind::Approximation { degree: 2 })
            .unwrap();

        let mut seen = (0, 0);
        ws.save_with(|series, models| {
            seen = (series.len(), models.len());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, (1, 1));

        let err = ws
            .save_with(|_, _| Err(TrendError::InvalidState("read-only".into())))
            .unwrap_err();
        assert!(matches!(err, TrendError::InvalidState(_)));
        assert_eq!(
            ws.state(),
            &WorkspaceState::Error("invalid state: read-only".to_string())
        );
    }
}
