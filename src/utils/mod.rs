//! Numerical utilities shared by the models.

pub mod metrics;
pub mod polyfit;

pub use metrics::{
    evaluate_fit, mean_squared_error, r_squared, root_mean_squared_error, FitMetrics,
};
pub use polyfit::{horner, polyfit};
