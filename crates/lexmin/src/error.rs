//! Error taxonomy: shape validation vs. factorization failures.

use thiserror::Error;

/// Failure of the affine null space routine for a single restricted form.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FactorizationError {
    #[error("matrix or right-hand side contains non-finite values")]
    NonFinite,
    /// Only the eigen backend requires symmetry.
    #[error("matrix is not symmetric (relative asymmetry {asymmetry:e})")]
    NotSymmetric { asymmetry: f64 },
    #[error("decomposition failed: {0}")]
    Decomposition(&'static str),
    #[error("triangular solve failed at numerical rank {rank}")]
    Singular { rank: usize },
}

/// Errors surfaced by `LexSolver::solve`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("objective list is empty")]
    EmptyObjectives,
    /// `level` is the offending objective; `None` refers to the bounds.
    #[error("dimension mismatch ({}): {reason}", level_label(.level))]
    DimensionMismatch { level: Option<usize>, reason: String },
    #[error("invalid bounds at index {index}: lower {lower} > upper {upper}")]
    InvalidBounds { index: usize, lower: f64, upper: f64 },
    #[error("factorization failed at level {level}")]
    Factorization {
        level: usize,
        #[source]
        source: FactorizationError,
    },
}

fn level_label(level: &Option<usize>) -> String {
    match level {
        Some(l) => format!("level {l}"),
        None => "bounds".to_string(),
    }
}

impl LexError {
    pub(crate) fn dims(level: Option<usize>, reason: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            level,
            reason: reason.into(),
        }
    }
}
