//! Models deriving a new series from an original one.

mod traits;

pub mod approximation;
pub mod filtration;

pub use approximation::{Approximation, ApproximationBuilder, FormulaStyle};
pub use filtration::{MaFiltration, MaFiltrationBuilder};
pub use traits::{BoxedModel, Model, ModelKind};
