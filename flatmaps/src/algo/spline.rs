//! Interpolating B-splines of odd degree
//!
//! Fits a spline of degree k ∈ {1, 3, 5} that passes exactly through every
//! input sample, then evaluates it anywhere on the real line. Knots sit on
//! the data abscissae with the `(k+1)/2` points nearest each end left out
//! of the interior knot set (the "not-a-knot" placement), so a cubic fit
//! through samples of any cubic polynomial reproduces it exactly.
//!
//! Queries outside the sampled range are extrapolated with the first/last
//! polynomial piece. Callers that want zero (or anything else) outside the
//! valid range apply that policy themselves after evaluation.
//!
//! # Examples
//!
//! ```rust
//! use flatmaps::algo::spline::Spline;
//!
//! let x = vec![0.0, 1.0, 2.0, 3.0, 4.0];
//! let y: Vec<f64> = x.iter().map(|v| v * v * v).collect();
//! let spline = Spline::new(&x, &y, 3).unwrap();
//!
//! assert!((spline.evaluate(2.5) - 15.625).abs() < 1e-9);
//! ```

use ndarray::Array2;
use thiserror::Error;

/// Highest spline degree supported
pub const MAX_DEGREE: usize = 5;

/// Errors raised while fitting a spline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("Unsupported spline degree {0} (must be 1, 3 or 5)")]
    UnsupportedDegree(usize),

    #[error("X and Y must have the same length ({x} vs {y})")]
    MismatchedLengths { x: usize, y: usize },

    #[error("A degree {degree} spline needs more than {degree} points, got {points}")]
    TooFewPoints { points: usize, degree: usize },

    #[error("Non-finite sample at index {0}")]
    NonFinite(usize),

    #[error("X values must be strictly increasing (violated at index {0})")]
    UnsortedData(usize),

    #[error("Collocation system is singular")]
    Singular,
}

/// Interpolating spline in B-spline form.
#[derive(Debug, Clone)]
pub struct Spline {
    degree: usize,
    knots: Vec<f64>,
    coeffs: Vec<f64>,
}

impl Spline {
    /// Fit an interpolating spline of the given degree through `(x, y)`.
    ///
    /// # Arguments
    /// * `x` - Sample positions, strictly increasing
    /// * `y` - Sample values
    /// * `degree` - 1, 3 or 5
    ///
    /// # Performance
    /// O(n·k²) to solve the banded collocation system.
    pub fn new(x: &[f64], y: &[f64], degree: usize) -> Result<Self, SplineError> {
        validate_samples(x, y, degree)?;

        let knots = not_a_knot_knots(x, degree);
        let mut spline = Self {
            degree,
            knots,
            coeffs: Vec::new(),
        };
        spline.coeffs = spline.solve_collocation(x, y)?;
        Ok(spline)
    }

    /// Cubic spline through `(x, y)`
    pub fn cubic(x: &[f64], y: &[f64]) -> Result<Self, SplineError> {
        Self::new(x, y, 3)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Range `(x_min, x_max)` covered by the fitted samples
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[0], self.knots[self.knots.len() - 1])
    }

    /// Evaluate the spline at `x`, extrapolating beyond the sampled range.
    pub fn evaluate(&self, x: f64) -> f64 {
        let span = self.find_span(x);
        let basis = self.basis_funs(span, x);
        let first = span - self.degree;
        (0..=self.degree)
            .map(|r| basis[r] * self.coeffs[first + r])
            .sum()
    }

    /// Evaluate at every entry of a 2D grid, keeping its shape.
    pub fn evaluate_grid(&self, grid: &Array2<f64>) -> Array2<f64> {
        grid.mapv(|x| self.evaluate(x))
    }

    /// Evenly sample the spline across its domain.
    ///
    /// Returns `(x_values, y_values)` with `n_points` entries each; the first
    /// and last points land exactly on the domain endpoints.
    pub fn interpolate(&self, n_points: usize) -> (Vec<f64>, Vec<f64>) {
        assert!(n_points >= 2, "Need at least 2 output points");
        let (x_min, x_max) = self.domain();
        let dx = (x_max - x_min) / (n_points - 1) as f64;

        (0..n_points)
            .map(|i| {
                let x = if i == n_points - 1 {
                    x_max
                } else {
                    x_min + i as f64 * dx
                };
                (x, self.evaluate(x))
            })
            .unzip()
    }

    /// Index of the knot interval whose polynomial piece covers `x`.
    ///
    /// Clamped to the first/last non-degenerate interval so that
    /// out-of-range queries extrapolate.
    fn find_span(&self, x: f64) -> usize {
        let k = self.degree;
        // Number of basis functions; `coeffs` is still empty while fitting.
        let n = self.knots.len() - k - 1;
        if x >= self.knots[n] {
            return n - 1;
        }
        if x <= self.knots[k] {
            return k;
        }
        k + self.knots[k + 1..n].partition_point(|&t| t <= x)
    }

    /// Values of the k+1 basis functions that are non-zero on `span`.
    fn basis_funs(&self, span: usize, x: f64) -> [f64; MAX_DEGREE + 1] {
        let k = self.degree;
        let t = &self.knots;
        let mut n = [0.0; MAX_DEGREE + 1];
        let mut left = [0.0; MAX_DEGREE + 1];
        let mut right = [0.0; MAX_DEGREE + 1];

        n[0] = 1.0;
        for j in 1..=k {
            left[j] = x - t[span + 1 - j];
            right[j] = t[span + j] - x;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = n[r] / (right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }
        n
    }

    /// Solve for the B-spline coefficients that interpolate the samples.
    ///
    /// The collocation matrix is banded (half-width k) and totally positive,
    /// so Gaussian elimination without pivoting is stable.
    fn solve_collocation(&self, x: &[f64], y: &[f64]) -> Result<Vec<f64>, SplineError> {
        let k = self.degree;
        let n = x.len();
        let width = 2 * k + 1;
        let at = |row: usize, col: usize| row * width + (col + k - row);

        let mut band = vec![0.0; n * width];
        for (row, &xj) in x.iter().enumerate() {
            let span = self.find_span(xj);
            let basis = self.basis_funs(span, xj);
            for (r, value) in basis.iter().take(k + 1).enumerate() {
                let col = span - k + r;
                debug_assert!(col + k >= row && col <= row + k);
                band[at(row, col)] = *value;
            }
        }

        let mut rhs = y.to_vec();
        for p in 0..n {
            let pivot = band[at(p, p)];
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(SplineError::Singular);
            }
            let last = (p + k + 1).min(n);
            for r in p + 1..last {
                let factor = band[at(r, p)] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for c in p..last {
                    band[at(r, c)] -= factor * band[at(p, c)];
                }
                rhs[r] -= factor * rhs[p];
            }
        }

        let mut coeffs = vec![0.0; n];
        for p in (0..n).rev() {
            let last = (p + k + 1).min(n);
            let mut sum = rhs[p];
            for c in p + 1..last {
                sum -= band[at(p, c)] * coeffs[c];
            }
            coeffs[p] = sum / band[at(p, p)];
        }
        Ok(coeffs)
    }
}

fn validate_samples(x: &[f64], y: &[f64], degree: usize) -> Result<(), SplineError> {
    if !matches!(degree, 1 | 3 | 5) {
        return Err(SplineError::UnsupportedDegree(degree));
    }
    if x.len() != y.len() {
        return Err(SplineError::MismatchedLengths {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() <= degree {
        return Err(SplineError::TooFewPoints {
            points: x.len(),
            degree,
        });
    }
    if let Some(i) = x
        .iter()
        .zip(y)
        .position(|(a, b)| !a.is_finite() || !b.is_finite())
    {
        return Err(SplineError::NonFinite(i));
    }
    if let Some(i) = (1..x.len()).find(|&i| x[i] <= x[i - 1]) {
        return Err(SplineError::UnsortedData(i));
    }
    Ok(())
}

/// Clamped knot vector with interior knots on the data, skipping the
/// `(k+1)/2` samples nearest each end.
fn not_a_knot_knots(x: &[f64], degree: usize) -> Vec<f64> {
    let n = x.len();
    let skip = (degree + 1) / 2;
    let mut knots = Vec::with_capacity(n + degree + 1);
    knots.extend(std::iter::repeat(x[0]).take(degree + 1));
    knots.extend_from_slice(&x[skip..n - skip]);
    knots.extend(std::iter::repeat(x[n - 1]).take(degree + 1));
    knots
}

/// Fit a spline and sample it at `n_points` evenly spaced positions.
pub fn spline_interpolate(
    x: &[f64],
    y: &[f64],
    degree: usize,
    n_points: usize,
) -> Result<(Vec<f64>, Vec<f64>), SplineError> {
    Ok(Spline::new(x, y, degree)?.interpolate(n_points))
}
