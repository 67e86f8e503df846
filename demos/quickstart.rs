//! Quickstart example demonstrating basic usage of anofox-trend.
//!
//! Run with: cargo run --example quickstart
//! Set RUST_LOG=anofox_trend=debug to see compute events.

use anofox_trend::core::Series;
use anofox_trend::models::{Model, ModelKind};
use anofox_trend::workspace::Workspace;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== anofox-trend Quickstart ===\n");

    // 1. Load a series into a workspace
    let mut workspace = Workspace::new();
    workspace
        .load_with(|| {
            let values: Vec<f64> = (0..60)
                .map(|i| {
                    let t = i as f64;
                    20.0 + 0.4 * t - 0.004 * t * t + 2.0 * (t * 0.7).sin()
                })
                .collect();
            Series::from_values("quotes", 1, &values)
                .map(|s| s.with_description("synthetic daily quotes"))
        })
        .unwrap();
    println!("Loaded series 'quotes'");

    // 2. Compute a few models
    let kinds = [
        ModelKind::Approximation { degree: 1 },
        ModelKind::Approximation { degree: 2 },
        ModelKind::Approximation { degree: 4 },
        ModelKind::MovingAverage { window: 3 },
        ModelKind::MovingAverage { window: 7 },
    ];
    for kind in kinds {
        workspace.calculate("quotes", kind).unwrap();
    }

    // 3. Compare fit quality
    println!("\n{:<60} {:>10} {:>10}", "Model", "MSE", "R²");
    println!("{:-<82}", "");
    for model in workspace.models() {
        let metrics = model.fit_metrics().unwrap();
        println!(
            "{:<60} {:>10.4} {:>10.4}",
            model.description(),
            metrics.mse,
            metrics.r_squared
        );
    }

    // 4. A failing calculation leaves the workspace in an error state
    let err = workspace
        .calculate("quotes", ModelKind::MovingAverage { window: 500 })
        .unwrap_err();
    println!("\nExpected failure: {err}");
    println!("State: {:?}", workspace.state());
    workspace.acknowledge().unwrap();
    println!("State after acknowledge: {:?}", workspace.state());
}
