//! Regular-grid bivariate spline interpolation
//!
//! Resamples a 2D array known on a rectilinear grid onto new axes using the
//! tensor-product interpolating spline: fit along x for every input row,
//! then along y for every output column.

use ndarray::{Array2, Axis};
use std::time::Instant;
use thiserror::Error;

use super::spline::{Spline, SplineError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridInterpError {
    #[error("Grid shape {grid:?} does not match axes (ny={ny}, nx={nx})")]
    AxisMismatch {
        grid: (usize, usize),
        ny: usize,
        nx: usize,
    },

    #[error("Spline fit failed: {0}")]
    Spline(#[from] SplineError),
}

/// Interpolate `in_grid`, sampled at `(in_y, in_x)`, onto `(out_y, out_x)`.
///
/// # Arguments
/// * `in_grid` - Input samples, shape `(in_y.len(), in_x.len())`
/// * `in_y`, `in_x` - Strictly increasing input axes (row, column)
/// * `out_y`, `out_x` - Output axes, any order
/// * `ky`, `kx` - Spline degree along each axis (1, 3 or 5)
///
/// # Returns
/// Array of shape `(out_y.len(), out_x.len())`
pub fn interpolate_grid(
    in_grid: &Array2<f64>,
    in_y: &[f64],
    in_x: &[f64],
    out_y: &[f64],
    out_x: &[f64],
    ky: usize,
    kx: usize,
) -> Result<Array2<f64>, GridInterpError> {
    if in_grid.dim() != (in_y.len(), in_x.len()) {
        return Err(GridInterpError::AxisMismatch {
            grid: in_grid.dim(),
            ny: in_y.len(),
            nx: in_x.len(),
        });
    }
    let start = Instant::now();

    let mut along_x = Array2::zeros((in_y.len(), out_x.len()));
    for (row, mut out_row) in in_grid.axis_iter(Axis(0)).zip(along_x.axis_iter_mut(Axis(0))) {
        let spline = Spline::new(in_x, &row.to_vec(), kx)?;
        for (out, &x) in out_row.iter_mut().zip(out_x) {
            *out = spline.evaluate(x);
        }
    }

    let mut result = Array2::zeros((out_y.len(), out_x.len()));
    for (col, mut out_col) in along_x.axis_iter(Axis(1)).zip(result.axis_iter_mut(Axis(1))) {
        let spline = Spline::new(in_y, &col.to_vec(), ky)?;
        for (out, &y) in out_col.iter_mut().zip(out_y) {
            *out = spline.evaluate(y);
        }
    }

    log::debug!(
        "interpolate_grid {:?} -> {:?} took {:?}",
        in_grid.dim(),
        result.dim(),
        start.elapsed()
    );
    Ok(result)
}
