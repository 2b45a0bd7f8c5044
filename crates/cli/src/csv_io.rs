//! Header-less numeric CSV ⇄ nalgebra.
//!
//! Matrices are read row-major as written (one CSV row per matrix row);
//! vectors may be a single column or a single row.

use anyhow::{bail, Context, Result};
use nalgebra::{DMatrix, DVector};
use polars::prelude::*;
use std::path::Path;

pub fn read_matrix(path: &Path) -> Result<DMatrix<f64>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(false)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .collect()
        .with_context(|| format!("parsing {}", path.display()))?;
    let (rows, cols) = df.shape();
    tracing::debug!(path = %path.display(), rows, cols, "csv_shape");
    let mut m = DMatrix::zeros(rows, cols);
    for (j, series) in df.get_columns().iter().enumerate() {
        let values = series
            .cast(&DataType::Float64)
            .with_context(|| format!("column {j} of {} is not numeric", path.display()))?;
        for (i, v) in values.f64()?.into_iter().enumerate() {
            m[(i, j)] = v.with_context(|| {
                format!("missing value at row {i}, column {j} in {}", path.display())
            })?;
        }
    }
    Ok(m)
}

pub fn read_vector(path: &Path) -> Result<DVector<f64>> {
    let m = read_matrix(path)?;
    match m.shape() {
        (_, 1) => Ok(m.column(0).into_owned()),
        (1, _) => Ok(m.row(0).transpose()),
        (r, c) => bail!("{} holds a {r}x{c} matrix, expected a vector", path.display()),
    }
}
