//! Box bounds inside an affine solution set.
//!
//! The solution set of the restricted subproblem is `y₀ + span(N)`. We look for
//! a point of that set inside the box by alternating projections: clamp into
//! the box, then project orthogonally back onto the affine set (`N` has
//! orthonormal columns). Iterates never leave the affine set, so stationarity
//! of the level is preserved even when the box cannot be met.

use nalgebra::{DMatrix, DVector};
use tracing::warn;

use crate::cfg::NullSpaceCfg;
use crate::types::Bounds;

/// Move `particular` along `basis` toward `bounds`; returns a point of
/// `particular + span(basis)`.
pub fn fit_to_bounds(
    particular: &DVector<f64>,
    basis: &DMatrix<f64>,
    bounds: &Bounds,
    cfg: &NullSpaceCfg,
) -> DVector<f64> {
    debug_assert_eq!(bounds.dim(), particular.len());
    if basis.ncols() == 0 || bounds.contains_eps(particular, cfg.bound_tol) {
        return particular.clone();
    }
    let bt = basis.transpose();
    let mut y = particular.clone();
    for _ in 0..cfg.bound_iters {
        let target = bounds.clamp(&y);
        let step = &bt * (target - particular);
        y = particular + basis * step;
        if bounds.contains_eps(&y, cfg.bound_tol) {
            return y;
        }
    }
    warn!(
        violation = bounds.violation(&y),
        iters = cfg.bound_iters,
        "bounds not met within the solution set"
    );
    y
}
