//! A priori lexicographic minimization of quadratic energies.
//!
//! Given energies `Eᵢ(x) = ½ xᵀHᵢx + xᵀfᵢ` ordered by priority, find the `x`
//! that minimizes `E₁`, then among those minimizers minimizes `E₂`, and so on.
//! Priorities are strict: a lower level never trades against a higher one.
//!
//! Layout
//! - `solver`: the null-space restriction loop (`LexSolver`, `solve`).
//! - `null_space`: the affine null space collaborator and its backends.
//! - `types`: objectives and box bounds.
//! - `gen`: seeded random systems for tests, benches, and the CLI demo.
//!
//! All matrices are dense `nalgebra` types; every call is a pure function of
//! its inputs apart from `tracing` events.

pub mod cfg;
pub mod error;
pub mod gen;
pub mod null_space;
pub mod solver;
pub mod types;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{LexCfg, NullSpaceCfg};
pub use error::{FactorizationError, LexError};
pub use null_space::{affine_null_space, AffineSolution, Factorization, NullSpaceBackend};
pub use solver::{solve, LevelReport, LexSolver, Solution};
pub use types::{energies, Bounds, QuadraticObjective};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::{LexCfg, NullSpaceCfg};
    pub use crate::error::{FactorizationError, LexError};
    pub use crate::null_space::Factorization;
    pub use crate::solver::{solve, LexSolver, Solution};
    pub use crate::types::{Bounds, QuadraticObjective};
    pub use nalgebra::{DMatrix, DVector};
}
