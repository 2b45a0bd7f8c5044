//! Seeded random test systems.
//!
//! - `singular_integer_system`: integer matrix with entries in `0..=8` and one
//!   zeroed row, paired with `f = H·1` so `H·x = f` is always consistent.
//! - `low_rank_psd`: `A·Aᵀ` with `A` n×r, symmetric PSD of rank r.
//! - `layered_objectives`: k PSD levels of decreasing rank, for benches and
//!   property tests.
//!
//! Every generator is deterministic in its seed (`StdRng::seed_from_u64`).

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::QuadraticObjective;

/// Linear coefficient of the identity level in `demo_objectives`.
pub const DEMO_IDENTITY_SHIFT: f64 = 0.2053202792;

/// Index of the row zeroed by `singular_integer_system` (`n - ⌈n/10⌉`).
#[inline]
pub fn zeroed_row(n: usize) -> usize {
    n - n.div_ceil(10)
}

/// Singular integer matrix `H` (n×n) and `f = H·1`; empty for `n = 0`.
pub fn singular_integer_system(n: usize, seed: u64) -> (DMatrix<f64>, DVector<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut h = DMatrix::from_fn(n, n, |_, _| rng.gen_range(0..9) as f64);
    if n > 0 {
        h.row_mut(zeroed_row(n)).fill(0.0);
    }
    let f = &h * DVector::from_element(n, 1.0);
    (h, f)
}

/// The demo problem: the singular system, optionally followed by the level
/// `(I, DEMO_IDENTITY_SHIFT·1)`.
pub fn demo_objectives(n: usize, seed: u64, two_level: bool) -> Vec<QuadraticObjective> {
    let (h, f) = singular_integer_system(n, seed);
    let mut out = vec![QuadraticObjective { h, f }];
    if two_level {
        out.push(QuadraticObjective {
            h: DMatrix::identity(n, n),
            f: DVector::from_element(n, DEMO_IDENTITY_SHIFT),
        });
    }
    out
}

/// Symmetric PSD matrix of rank `rank` (generically): `A·Aᵀ`, `A` entries in [-1, 1).
pub fn low_rank_psd(n: usize, rank: usize, seed: u64) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = DMatrix::from_fn(n, rank.min(n), |_, _| rng.gen_range(-1.0..1.0));
    &a * a.transpose()
}

/// `k` PSD levels over `n` variables; level i has rank about `n / (k + 1)`,
/// so the free space shrinks level by level without pinning early.
pub fn layered_objectives(n: usize, k: usize, seed: u64) -> Vec<QuadraticObjective> {
    let mut rng = StdRng::seed_from_u64(seed);
    let rank = (n / (k + 1)).max(1);
    (0..k)
        .map(|_| {
            let h = low_rank_psd(n, rank, rng.gen());
            let f = DVector::from_fn(n, |_, _| rng.gen_range(-1.0..1.0));
            QuadraticObjective { h, f }
        })
        .collect()
}
