//! Linear interpolation of tabulated 1D functions.
//!
//! Beam transfer functions and noise spectra arrive as (ℓ, value) tables.
//! Queries outside the tabulated range do not error: they return a
//! caller-chosen fill value, which is how "unknown at this scale" is
//! signalled downstream (typically `f64::INFINITY` for noise).

use ndarray::Array2;
use thiserror::Error;

/// Errors that can occur while building an interpolator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("Input vectors must have at least 2 points")]
    InsufficientData,
    #[error("Input vectors must have the same length")]
    MismatchedLengths,
    #[error("X values must be sorted in ascending order")]
    UnsortedData,
    #[error("Non-finite value in interpolation table at index {0}")]
    NonFinite(usize),
}

/// Piecewise-linear interpolant with a constant fill outside its domain.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    fill_value: f64,
}

impl LinearInterpolator {
    /// Build an interpolant over `(xs, ys)`.
    ///
    /// # Arguments
    /// * `xs` - Abscissae, strictly increasing
    /// * `ys` - Ordinates, same length as `xs`
    /// * `fill_value` - Returned for queries outside `[xs[0], xs[n-1]]`
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, fill_value: f64) -> Result<Self, InterpError> {
        if xs.len() != ys.len() {
            return Err(InterpError::MismatchedLengths);
        }
        if xs.len() < 2 {
            return Err(InterpError::InsufficientData);
        }
        if let Some(i) = xs.iter().position(|x| !x.is_finite()) {
            return Err(InterpError::NonFinite(i));
        }
        for i in 1..xs.len() {
            if xs[i] <= xs[i - 1] {
                return Err(InterpError::UnsortedData);
            }
        }
        Ok(Self { xs, ys, fill_value })
    }

    /// Evaluate at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        // NaN fails both comparisons and falls through to the fill.
        if !(x >= self.xs[0] && x <= self.xs[n - 1]) {
            return self.fill_value;
        }

        // partition_point returns the index of the first element > x
        let idx = self.xs.partition_point(|&val| val <= x);
        if idx == 0 {
            return self.ys[0];
        }
        if idx == n {
            return self.ys[n - 1];
        }

        let (x1, x2) = (self.xs[idx - 1], self.xs[idx]);
        let (y1, y2) = (self.ys[idx - 1], self.ys[idx]);
        let t = (x - x1) / (x2 - x1);
        y1 + t * (y2 - y1)
    }

    /// Evaluate at every entry of a 2D grid.
    pub fn eval_grid(&self, grid: &Array2<f64>) -> Array2<f64> {
        grid.mapv(|x| self.eval(x))
    }

    /// Domain `(min, max)` of the table
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}
