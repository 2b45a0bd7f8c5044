//! SVD backend.
//!
//! `H = U Σ Vᵀ`; columns of `V` with `σ ≤ tol` span the null space and the
//! pseudo-inverse over the remaining ones gives the least-norm solution.
//! Singular values are not assumed to be sorted.

use nalgebra::{DMatrix, DVector, SVD};

use super::{numerical_rank, AffineSolution, NullSpaceBackend};
use crate::cfg::NullSpaceCfg;
use crate::error::FactorizationError;

#[derive(Clone, Copy, Debug, Default)]
pub struct SvdBackend;

impl NullSpaceBackend for SvdBackend {
    fn name(&self) -> &'static str {
        "svd"
    }

    fn decompose(
        &self,
        h: &DMatrix<f64>,
        rhs: &DVector<f64>,
        cfg: &NullSpaceCfg,
    ) -> Result<AffineSolution, FactorizationError> {
        let m = h.nrows();
        let svd = SVD::new(h.clone(), true, true);
        let u = svd
            .u
            .ok_or(FactorizationError::Decomposition("SVD did not compute U"))?;
        let v = svd
            .v_t
            .ok_or(FactorizationError::Decomposition("SVD did not compute Vᵀ"))?
            .transpose();
        let sigma = svd.singular_values;
        let rank = numerical_rank(sigma.as_slice(), cfg.rank_tol);
        let tol = cfg.rank_tol * sigma.amax();

        let mut null_cols = Vec::with_capacity(m - rank);
        let mut particular = DVector::zeros(m);
        for (i, &s) in sigma.iter().enumerate() {
            if s > tol {
                let coeff = u.column(i).dot(rhs) / s;
                particular.axpy(coeff, &v.column(i), 1.0);
            } else {
                null_cols.push(v.column(i).into_owned());
            }
        }
        let basis = if null_cols.is_empty() {
            DMatrix::zeros(m, 0)
        } else {
            DMatrix::from_columns(&null_cols)
        };
        Ok(AffineSolution {
            basis,
            particular,
            rank,
        })
    }
}
