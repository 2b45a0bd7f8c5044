//! Objectives and box bounds.
//!
//! - `QuadraticObjective`: one priority level `E(x) = ½ xᵀHx + xᵀf`.
//! - `Bounds`: optional box `lower ≤ x ≤ upper` threaded through the solver.
//!
//! Symmetry of `H` is a caller assumption; only shapes are validated here.

use nalgebra::{DMatrix, DVector};

use crate::error::LexError;

/// Single priority level: quadratic coefficients `h` (n×n) and linear `f` (n).
#[derive(Clone, Debug, PartialEq)]
pub struct QuadraticObjective {
    pub h: DMatrix<f64>,
    pub f: DVector<f64>,
}

impl QuadraticObjective {
    /// Validating constructor; fails if `h` is not square or `f` has the wrong length.
    pub fn new(h: DMatrix<f64>, f: DVector<f64>) -> Result<Self, LexError> {
        let obj = Self { h, f };
        obj.check_shape(None)?;
        Ok(obj)
    }

    /// The trivial level `H = 0`, `f = 0`.
    pub fn zeros(n: usize) -> Self {
        Self {
            h: DMatrix::zeros(n, n),
            f: DVector::zeros(n),
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.h.nrows()
    }

    /// `½ xᵀHx + xᵀf`.
    #[inline]
    pub fn energy(&self, x: &DVector<f64>) -> f64 {
        0.5 * x.dot(&(&self.h * x)) + x.dot(&self.f)
    }

    /// `Hx + f`.
    #[inline]
    pub fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        &self.h * x + &self.f
    }

    pub(crate) fn check_shape(&self, level: Option<usize>) -> Result<(), LexError> {
        let (r, c) = self.h.shape();
        if r != c {
            return Err(LexError::dims(level, format!("H is {r}x{c}, expected square")));
        }
        if self.f.len() != r {
            return Err(LexError::dims(
                level,
                format!("f has length {}, expected {r}", self.f.len()),
            ));
        }
        Ok(())
    }
}

/// Energies `Eᵢ(x)` of every level, in input order.
pub fn energies(objectives: &[QuadraticObjective], x: &DVector<f64>) -> Vec<f64> {
    objectives.iter().map(|o| o.energy(x)).collect()
}

/// Box `lower ≤ x ≤ upper` (componentwise, same length).
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    pub lower: DVector<f64>,
    pub upper: DVector<f64>,
}

impl Bounds {
    pub fn new(lower: DVector<f64>, upper: DVector<f64>) -> Result<Self, LexError> {
        let b = Self { lower, upper };
        b.validate()?;
        Ok(b)
    }

    /// The unit box `[0, 1]ⁿ`.
    pub fn unit(n: usize) -> Self {
        Self {
            lower: DVector::zeros(n),
            upper: DVector::from_element(n, 1.0),
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn validate(&self) -> Result<(), LexError> {
        if self.lower.len() != self.upper.len() {
            return Err(LexError::dims(
                None,
                format!(
                    "lower has length {}, upper has length {}",
                    self.lower.len(),
                    self.upper.len()
                ),
            ));
        }
        for (index, (&lower, &upper)) in self.lower.iter().zip(self.upper.iter()).enumerate() {
            // Written as a negation so NaN entries are rejected too.
            if !(lower <= upper) {
                return Err(LexError::InvalidBounds {
                    index,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }

    /// Componentwise clamp of `x` into the box.
    pub fn clamp(&self, x: &DVector<f64>) -> DVector<f64> {
        DVector::from_fn(x.len(), |i, _| x[i].clamp(self.lower[i], self.upper[i]))
    }

    /// Largest distance of any component of `x` outside the box (0 if inside).
    pub fn violation(&self, x: &DVector<f64>) -> f64 {
        x.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .map(|(&v, (&lo, &hi))| (lo - v).max(v - hi).max(0.0))
            .fold(0.0, f64::max)
    }

    #[inline]
    pub fn contains_eps(&self, x: &DVector<f64>, eps: f64) -> bool {
        self.violation(x) <= eps
    }
}
