//! Lexicographic solver: progressive null space restriction.
//!
//! Model
//! - Keep an orthonormal basis `N` of the directions still free after all
//!   processed levels, and a point `Z` that is stationary for all of them.
//!   Every feasible point is `x = N·y + Z`.
//! - Level `(H, f)` restricted to that set reads `½yᵀ(NᵀHN)y + yᵀNᵀ(HZ + f)`
//!   up to a constant. Solve it with the affine null space routine, lift the
//!   reduced solution back (`Z ← N·Y + Z`), and keep only the directions the
//!   level leaves free (`N ← N·Nᵢ`).
//! - A level with trivial null space pins `Z`; remaining levels are skipped.
//!
//! Bounds
//! - Caller bounds are a box on `x` and are enforced in `x`. After each level
//!   the lifted point `N·Y + Z` slides along the lifted free directions
//!   `N·Nᵢ` toward the box; a point already inside the box is kept as is, so
//!   a trivial level never moves `Z`.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::cfg::{LexCfg, NullSpaceCfg};
use crate::error::LexError;
use crate::null_space::{affine_null_space, fit_to_bounds, Factorization, NullSpaceBackend};
use crate::types::{energies, Bounds, QuadraticObjective};

/// Per-level trace of the restriction loop.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelReport {
    pub level: usize,
    /// Columns of `N` entering the level.
    pub free_before: usize,
    /// Columns of `N` leaving the level (0 when the level pinned `Z`).
    pub free_after: usize,
    /// Numerical rank of the restricted form.
    pub rank: usize,
    /// `‖N·Y‖`, the move of `Z` caused by this level.
    pub step_norm: f64,
}

/// Solver output.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub x: DVector<f64>,
    /// Processed levels only; skipped levels have no report.
    pub levels: Vec<LevelReport>,
    /// Level whose restricted form had a trivial null space, if any.
    pub early_exit: Option<usize>,
    /// Free directions left after the last processed level; 0 means `x` is unique.
    pub free_dims: usize,
    /// `Eᵢ(x)` for every input level, processed or not.
    pub energies: Vec<f64>,
}

impl Solution {
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.free_dims == 0
    }
}

/// Running restriction: `x = basis·y + point`.
#[derive(Debug)]
struct Restriction {
    basis: DMatrix<f64>,
    point: DVector<f64>,
}

enum Step {
    Narrowed(Restriction),
    Pinned(DVector<f64>),
}

impl Restriction {
    fn full(n: usize) -> Self {
        Self {
            basis: DMatrix::identity(n, n),
            point: DVector::zeros(n),
        }
    }

    #[inline]
    fn free_dims(&self) -> usize {
        self.basis.ncols()
    }

    /// `(NᵀHN, Nᵀ(HZ + f))`.
    fn restrict(&self, obj: &QuadraticObjective) -> (DMatrix<f64>, DVector<f64>) {
        let nt = self.basis.transpose();
        let f = &nt * obj.gradient(&self.point);
        let h = &nt * (&obj.h * &self.basis);
        (h, f)
    }

    fn advance(
        self,
        level: usize,
        obj: &QuadraticObjective,
        backend: &dyn NullSpaceBackend,
        bounds: Option<&Bounds>,
        cfg: &NullSpaceCfg,
    ) -> Result<(Step, LevelReport), LexError> {
        let (h, f) = self.restrict(obj);
        let sol = affine_null_space(backend, &h, &(-f), None, cfg)
            .map_err(|source| LexError::Factorization { level, source })?;

        let basis = &self.basis * &sol.basis;
        let mut point = &self.basis * &sol.particular + &self.point;
        if let Some(b) = bounds {
            point = fit_to_bounds(&point, &basis, b, cfg);
        }
        let report = LevelReport {
            level,
            free_before: self.free_dims(),
            free_after: basis.ncols(),
            rank: sol.rank,
            step_norm: (&point - &self.point).norm(),
        };
        if basis.ncols() == 0 {
            return Ok((Step::Pinned(point), report));
        }
        Ok((Step::Narrowed(Restriction { basis, point }), report))
    }
}

/// Lexicographic minimizer with a fixed backend and tolerances.
pub struct LexSolver {
    cfg: NullSpaceCfg,
    backend: Box<dyn NullSpaceBackend>,
}

impl Default for LexSolver {
    fn default() -> Self {
        Self::new(LexCfg::default())
    }
}

impl LexSolver {
    pub fn new(cfg: LexCfg) -> Self {
        Self {
            cfg: cfg.null_space,
            backend: cfg.method.backend(),
        }
    }

    /// Use a custom rank-revealing strategy.
    pub fn with_backend(cfg: NullSpaceCfg, backend: Box<dyn NullSpaceBackend>) -> Self {
        Self { cfg, backend }
    }

    #[inline]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Minimize `objectives` in priority order (index 0 first), optionally
    /// inside the box `bounds`.
    pub fn solve(
        &self,
        objectives: &[QuadraticObjective],
        bounds: Option<&Bounds>,
    ) -> Result<Solution, LexError> {
        let n = validate(objectives, bounds)?;
        let mut state = Restriction::full(n);
        let mut levels = Vec::with_capacity(objectives.len());
        let mut pending = objectives.iter().enumerate();
        let (x, free_dims, early_exit) = loop {
            let Some((i, obj)) = pending.next() else {
                break (state.point, state.basis.ncols(), None);
            };
            let (step, report) = state.advance(i, obj, self.backend.as_ref(), bounds, &self.cfg)?;
            debug!(
                level = i,
                free_before = report.free_before,
                rank = report.rank,
                free_after = report.free_after,
                step_norm = report.step_norm,
                "level processed"
            );
            levels.push(report);
            match step {
                Step::Narrowed(next) => state = next,
                Step::Pinned(point) => break (point, 0, Some(i)),
            }
        };
        info!(
            backend = self.backend.name(),
            n,
            levels = levels.len(),
            early_exit = ?early_exit,
            free_dims,
            "lexicographic solve finished"
        );
        Ok(Solution {
            energies: energies(objectives, &x),
            x,
            levels,
            early_exit,
            free_dims,
        })
    }
}

/// Minimize `objectives` lexicographically with the given factorization and
/// default tolerances; returns the solution vector.
pub fn solve(
    objectives: &[QuadraticObjective],
    bounds: Option<&Bounds>,
    method: Factorization,
) -> Result<DVector<f64>, LexError> {
    LexSolver::new(LexCfg::with_method(method))
        .solve(objectives, bounds)
        .map(|s| s.x)
}

/// Shapes must agree across all levels and the bounds; returns `n`.
fn validate(objectives: &[QuadraticObjective], bounds: Option<&Bounds>) -> Result<usize, LexError> {
    let first = objectives.first().ok_or(LexError::EmptyObjectives)?;
    let n = first.dim();
    for (i, obj) in objectives.iter().enumerate() {
        obj.check_shape(Some(i))?;
        if obj.dim() != n {
            return Err(LexError::dims(
                Some(i),
                format!("objective has {} variables, level 0 has {n}", obj.dim()),
            ));
        }
    }
    if let Some(b) = bounds {
        b.validate()?;
        if b.dim() != n {
            return Err(LexError::dims(
                None,
                format!("bounds have length {}, objectives have {n} variables", b.dim()),
            ));
        }
    }
    Ok(n)
}

#[cfg(test)]
mod tests;
