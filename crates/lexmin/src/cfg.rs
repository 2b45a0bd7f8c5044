//! Tolerance defaults and solver configuration.
//!
//! Policy
//! - Defaults are fixed constants; callers that need different numerics build a
//!   `NullSpaceCfg` explicitly instead of mutating globals.

use crate::null_space::Factorization;

/// Relative rank threshold, scaled by the largest pivot / singular value.
pub const RANK_TOL: f64 = 1e-10;
/// Relative max-abs asymmetry accepted by the eigen backend.
pub const SYMMETRY_TOL: f64 = 1e-9;
/// Max box violation at which bounds fitting stops early.
pub const BOUND_TOL: f64 = 1e-10;
/// Iteration cap for bounds fitting (alternating projections).
pub const BOUND_ITERS: usize = 500;

/// Numerical knobs of the affine null space routine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NullSpaceCfg {
    pub rank_tol: f64,
    pub symmetry_tol: f64,
    pub bound_tol: f64,
    pub bound_iters: usize,
}

impl Default for NullSpaceCfg {
    fn default() -> Self {
        Self {
            rank_tol: RANK_TOL,
            symmetry_tol: SYMMETRY_TOL,
            bound_tol: BOUND_TOL,
            bound_iters: BOUND_ITERS,
        }
    }
}

/// Solver configuration: which factorization to use and its tolerances.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LexCfg {
    pub method: Factorization,
    pub null_space: NullSpaceCfg,
}

impl LexCfg {
    #[inline]
    pub fn with_method(method: Factorization) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }
}
