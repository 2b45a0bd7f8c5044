//! PyO3 bindings for the `lexmin` solver.
//!
//! Notes
//! - Keep bindings thin: inputs are nested Python lists (or anything PyO3 can
//!   extract as such, e.g. `ndarray.tolist()`), outputs are flat lists.
//! - All numerics stay in the `lexmin` crate.

use pyo3::prelude::*;

mod convert;

use convert::{map_lex_err, objectives_from_py, vector_from_py};
use lexmin::{Bounds, Factorization, LexCfg, LexSolver};

/// Lexicographic minimizer of `0.5 x.T H[i] x + x.T f[i]`, `i = 0` first.
///
/// `bounds`, if given, is a `(lower, upper)` pair of length-n lists.
#[pyfunction]
#[pyo3(signature = (h, f, method = "qr", bounds = None))]
fn null_space_method(
    h: Vec<Vec<Vec<f64>>>,
    f: Vec<Vec<f64>>,
    method: &str,
    bounds: Option<(Vec<f64>, Vec<f64>)>,
) -> PyResult<Vec<f64>> {
    let method: Factorization = method
        .parse()
        .map_err(pyo3::exceptions::PyValueError::new_err)?;
    let objectives = objectives_from_py(h, f)?;
    let bounds = bounds
        .map(|(lo, hi)| Bounds::new(vector_from_py(lo), vector_from_py(hi)))
        .transpose()
        .map_err(map_lex_err)?;
    let sol = LexSolver::new(LexCfg::with_method(method))
        .solve(&objectives, bounds.as_ref())
        .map_err(map_lex_err)?;
    Ok(sol.x.iter().copied().collect())
}

/// Energies `0.5 x.T H[i] x + x.T f[i]` at `x` for every level.
#[pyfunction]
fn energies(h: Vec<Vec<Vec<f64>>>, f: Vec<Vec<f64>>, x: Vec<f64>) -> PyResult<Vec<f64>> {
    let objectives = objectives_from_py(h, f)?;
    let x = vector_from_py(x);
    if let Some(o) = objectives.iter().find(|o| o.dim() != x.len()) {
        return Err(pyo3::exceptions::PyValueError::new_err(format!(
            "x has length {}, objective has {} variables",
            x.len(),
            o.dim()
        )));
    }
    Ok(lexmin::energies(&objectives, &x))
}

#[pymodule]
fn lexmin_native(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(null_space_method, m)?)?;
    m.add_function(wrap_pyfunction!(energies, m)?)?;
    m.add("__version__", lexmin::VERSION)?;
    Ok(())
}
