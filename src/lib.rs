//! # anofox-trend
//!
//! Trend modeling for indexed time series.
//!
//! Given a [`Series`](crate::core::Series) of `(time, value)` observations, the
//! library derives a least-squares polynomial
//! [`Approximation`](crate::models::Approximation) or a moving-average
//! [`MaFiltration`](crate::models::MaFiltration), and scores how well the derived
//! series explains the original (MSE, R²). A caller-owned
//! [`Workspace`](crate::workspace::Workspace) tracks loaded series and computed
//! models through an explicit state machine.
//!
//! ```
//! use std::sync::Arc;
//! use anofox_trend::prelude::*;
//!
//! let series = Series::from_points("demo", [(1, 2.0), (2, 4.0), (3, 6.0), (4, 8.0)]).unwrap();
//! let model = Approximation::new(Arc::new(series), 1).unwrap();
//!
//! assert!((model.evaluate(5.0).unwrap() - 10.0).abs() < 1e-9);
//! assert!(model.mean_squared_error().unwrap() < 1e-12);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod error;
pub mod models;
pub mod utils;
pub mod workspace;

pub use error::{Result, TrendError};

pub mod prelude {
    pub use crate::core::{DataPoint, Series};
    pub use crate::error::{Result, TrendError};
    pub use crate::models::{Approximation, BoxedModel, MaFiltration, Model, ModelKind};
    pub use crate::utils::FitMetrics;
    pub use crate::workspace::{Activity, Workspace, WorkspaceState};
}
