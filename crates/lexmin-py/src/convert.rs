use lexmin::{LexError, QuadraticObjective};
use nalgebra::{DMatrix, DVector};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub fn matrix_from_py(rows: Vec<Vec<f64>>) -> PyResult<DMatrix<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(PyValueError::new_err(format!(
            "ragged matrix: row {bad} has {} entries, row 0 has {ncols}",
            rows[bad].len()
        )));
    }
    Ok(DMatrix::from_row_iterator(
        nrows,
        ncols,
        rows.into_iter().flatten(),
    ))
}

pub fn vector_from_py(values: Vec<f64>) -> DVector<f64> {
    DVector::from_vec(values)
}

pub fn objectives_from_py(
    h: Vec<Vec<Vec<f64>>>,
    f: Vec<Vec<f64>>,
) -> PyResult<Vec<QuadraticObjective>> {
    if h.len() != f.len() {
        return Err(PyValueError::new_err(format!(
            "got {} quadratic and {} linear coefficient sets",
            h.len(),
            f.len()
        )));
    }
    h.into_iter()
        .zip(f)
        .map(|(h, f)| {
            let h = matrix_from_py(h)?;
            QuadraticObjective::new(h, vector_from_py(f)).map_err(map_lex_err)
        })
        .collect()
}

pub fn map_lex_err(err: LexError) -> PyErr {
    PyValueError::new_err(err.to_string())
}
