//! Affine null space: null space basis plus one particular solution.
//!
//! Purpose
//! - For a restricted quadratic form `H` (m×m) and right-hand side `b`, return
//!   `(N, y)` with `H·N ≈ 0` (orthonormal columns) and `H·y ≈ b` in the
//!   least-squares sense (least-norm when the system is consistent).
//!
//! Layout
//! - The solver loop depends only on `NullSpaceBackend`; pick a strategy
//!   through `Factorization` or pass a custom trait object.
//! - `affine_null_space` owns the shared checks: finite input, the all-zero
//!   form, and box bounds.
//!
//! Backends
//! - `qr`: column-pivoted QR of `Hᵀ` (default).
//! - `svd`: singular value decomposition.
//! - `eigen`: symmetric eigendecomposition (rejects asymmetric input).

mod bounds;
mod eigen;
mod qr;
mod svd;

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};

use crate::cfg::NullSpaceCfg;
use crate::error::FactorizationError;
use crate::types::Bounds;

pub use bounds::fit_to_bounds;
pub use eigen::EigenBackend;
pub use qr::QrBackend;
pub use svd::SvdBackend;

/// Result of the affine null space routine in the reduced coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineSolution {
    /// m×d, orthonormal columns spanning the null space (d may be 0).
    pub basis: DMatrix<f64>,
    /// Length m particular solution.
    pub particular: DVector<f64>,
    /// Numerical rank used to split range and null space.
    pub rank: usize,
}

impl AffineSolution {
    #[inline]
    pub fn nullity(&self) -> usize {
        self.basis.ncols()
    }
}

/// Rank-revealing strategy behind the affine null space routine.
///
/// Implementations may assume `h` is square, finite, and not identically zero.
pub trait NullSpaceBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn decompose(
        &self,
        h: &DMatrix<f64>,
        rhs: &DVector<f64>,
        cfg: &NullSpaceCfg,
    ) -> Result<AffineSolution, FactorizationError>;
}

/// Enumerated backend identifier (`qr`, `svd`, `eigen`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Factorization {
    #[default]
    Qr,
    Svd,
    SymmetricEigen,
}

impl Factorization {
    pub const ALL: [Factorization; 3] = [
        Factorization::Qr,
        Factorization::Svd,
        Factorization::SymmetricEigen,
    ];

    pub fn backend(self) -> Box<dyn NullSpaceBackend> {
        match self {
            Factorization::Qr => Box::new(QrBackend),
            Factorization::Svd => Box::new(SvdBackend),
            Factorization::SymmetricEigen => Box::new(EigenBackend),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Factorization::Qr => "qr",
            Factorization::Svd => "svd",
            Factorization::SymmetricEigen => "eigen",
        }
    }
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Factorization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qr" => Ok(Factorization::Qr),
            "svd" => Ok(Factorization::Svd),
            "eigen" | "symmetric-eigen" => Ok(Factorization::SymmetricEigen),
            other => Err(format!(
                "unknown factorization method '{other}' (expected qr, svd, or eigen)"
            )),
        }
    }
}

/// Null space basis and particular solution of `h·y = rhs`, optionally moved
/// toward the box `bounds` without leaving the solution set.
pub fn affine_null_space(
    backend: &dyn NullSpaceBackend,
    h: &DMatrix<f64>,
    rhs: &DVector<f64>,
    bounds: Option<&Bounds>,
    cfg: &NullSpaceCfg,
) -> Result<AffineSolution, FactorizationError> {
    debug_assert!(h.is_square(), "restricted form must be square");
    debug_assert_eq!(h.nrows(), rhs.len());
    if !h.iter().chain(rhs.iter()).all(|v| v.is_finite()) {
        return Err(FactorizationError::NonFinite);
    }
    let m = h.nrows();
    let mut sol = if h.amax() == 0.0 {
        // Every direction is free; the least-norm solution of 0·y = b is 0.
        AffineSolution {
            basis: DMatrix::identity(m, m),
            particular: DVector::zeros(m),
            rank: 0,
        }
    } else {
        backend.decompose(h, rhs, cfg)?
    };
    if let Some(b) = bounds {
        sol.particular = fit_to_bounds(&sol.particular, &sol.basis, b, cfg);
    }
    Ok(sol)
}

/// Numerical rank: count of `values` above `rank_tol · max|values|`.
pub(crate) fn numerical_rank(values: &[f64], rank_tol: f64) -> usize {
    let scale = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return 0;
    }
    let tol = rank_tol * scale;
    values.iter().filter(|v| v.abs() > tol).count()
}
