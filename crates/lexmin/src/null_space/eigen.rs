//! Symmetric eigendecomposition backend.
//!
//! Only valid for symmetric forms, which is what the lexicographic loop
//! produces from symmetric inputs. Asymmetric input is rejected rather than
//! silently symmetrized.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use super::{numerical_rank, AffineSolution, NullSpaceBackend};
use crate::cfg::NullSpaceCfg;
use crate::error::FactorizationError;

#[derive(Clone, Copy, Debug, Default)]
pub struct EigenBackend;

impl NullSpaceBackend for EigenBackend {
    fn name(&self) -> &'static str {
        "eigen"
    }

    fn decompose(
        &self,
        h: &DMatrix<f64>,
        rhs: &DVector<f64>,
        cfg: &NullSpaceCfg,
    ) -> Result<AffineSolution, FactorizationError> {
        let m = h.nrows();
        let asymmetry = (h - h.transpose()).amax() / h.amax();
        if asymmetry > cfg.symmetry_tol {
            return Err(FactorizationError::NotSymmetric { asymmetry });
        }

        let eig = SymmetricEigen::new(h.clone());
        let lambda = &eig.eigenvalues;
        let rank = numerical_rank(lambda.as_slice(), cfg.rank_tol);
        let tol = cfg.rank_tol * lambda.amax();

        let mut null_cols = Vec::with_capacity(m - rank);
        let mut particular = DVector::zeros(m);
        for (i, &l) in lambda.iter().enumerate() {
            let v = eig.eigenvectors.column(i);
            if l.abs() > tol {
                particular.axpy(v.dot(rhs) / l, &v, 1.0);
            } else {
                null_cols.push(v.into_owned());
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
