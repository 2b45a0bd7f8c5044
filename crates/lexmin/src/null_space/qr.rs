//! Column-pivoted QR backend (rank revealing).
//!
//! Factor `Hᵀ·P = Q·R`. The first `r` columns of `Q` span the row space of `H`
//! and the remaining ones its null space, with `r` read off the pivots `|Rᵢᵢ|`.
//! The particular solution is the least-squares solution restricted to the row
//! space, obtained from a thin QR of `H·Q₁` (full column rank by construction).

use nalgebra::{DMatrix, DVector};

use super::{numerical_rank, AffineSolution, NullSpaceBackend};
use crate::cfg::NullSpaceCfg;
use crate::error::FactorizationError;

#[derive(Clone, Copy, Debug, Default)]
pub struct QrBackend;

impl NullSpaceBackend for QrBackend {
    fn name(&self) -> &'static str {
        "qr"
    }

    fn decompose(
        &self,
        h: &DMatrix<f64>,
        rhs: &DVector<f64>,
        cfg: &NullSpaceCfg,
    ) -> Result<AffineSolution, FactorizationError> {
        let m = h.nrows();
        let qr = h.transpose().col_piv_qr();
        let q = qr.q();
        let pivots = qr.r().diagonal();
        let rank = numerical_rank(pivots.as_slice(), cfg.rank_tol);

        let basis = q.columns(rank, m - rank).into_owned();
        if rank == 0 {
            return Ok(AffineSolution {
                basis,
                particular: DVector::zeros(m),
                rank,
            });
        }

        let q1 = q.columns(0, rank);
        let thin = (h * &q1).qr();
        let coeffs = thin
            .r()
            .solve_upper_triangular(&(thin.q().transpose() * rhs))
            .ok_or(FactorizationError::Singular { rank })?;
        let particular = &q1 * coeffs;
        if !particular.iter().all(|v| v.is_finite()) {
            return Err(FactorizationError::Singular { rank });
        }
        Ok(AffineSolution {
            basis,
            particular,
            rank,
        })
    }
}
