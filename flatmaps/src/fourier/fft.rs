//! 2D discrete Fourier transform pair on `ndarray` grids
//!
//! Conventions relied on by the rest of the crate:
//! - index `(0, 0)` is the zero frequency, negative frequencies wrap to the
//!   upper half of each axis (no shifting is applied);
//! - the forward transform is unnormalized with kernel `exp(-2πi k·n / N)`;
//! - the inverse transform carries the full `1 / (Nx·Ny)` normalization.
//!
//! The GRF amplitude normalization in [`crate::grf`] depends on the last point.

use ndarray::{Array2, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Planned forward/inverse 2D transforms for one array shape.
///
/// Plans are immutable and can be shared between threads.
pub struct Fft2 {
    shape: (usize, usize),
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl Fft2 {
    /// Plan transforms for arrays of shape `(ny, nx)`.
    pub fn new(shape: (usize, usize)) -> Self {
        let (ny, nx) = shape;
        let mut planner = FftPlanner::new();
        Self {
            shape,
            row_forward: planner.plan_fft_forward(nx),
            row_inverse: planner.plan_fft_inverse(nx),
            col_forward: planner.plan_fft_forward(ny),
            col_inverse: planner.plan_fft_inverse(ny),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Forward transform of a real array
    pub fn forward(&self, data: &Array2<f64>) -> Array2<Complex64> {
        self.forward_complex(data.mapv(|v| Complex64::new(v, 0.0)))
    }

    /// Forward transform of a complex array, in place on the owned buffer
    pub fn forward_complex(&self, mut kmap: Array2<Complex64>) -> Array2<Complex64> {
        self.check_shape(kmap.dim());
        transform_lanes(&mut kmap, Axis(1), self.row_forward.as_ref());
        transform_lanes(&mut kmap, Axis(0), self.col_forward.as_ref());
        kmap
    }

    /// Normalized inverse transform
    pub fn inverse(&self, mut kmap: Array2<Complex64>) -> Array2<Complex64> {
        self.check_shape(kmap.dim());
        transform_lanes(&mut kmap, Axis(1), self.row_inverse.as_ref());
        transform_lanes(&mut kmap, Axis(0), self.col_inverse.as_ref());

        let norm = 1.0 / (self.shape.0 * self.shape.1) as f64;
        kmap.mapv_inplace(|c| c * norm);
        kmap
    }

    /// Real part of the normalized inverse transform
    pub fn inverse_real(&self, kmap: Array2<Complex64>) -> Array2<f64> {
        self.inverse(kmap).mapv(|c| c.re)
    }

    fn check_shape(&self, dim: (usize, usize)) {
        assert_eq!(
            dim, self.shape,
            "Array shape does not match the planned FFT shape"
        );
    }
}

/// Run a 1D transform along every lane of `axis`.
fn transform_lanes(data: &mut Array2<Complex64>, axis: Axis, fft: &dyn Fft<f64>) {
    let zero = Complex64::new(0.0, 0.0);
    let mut buffer = vec![zero; data.len_of(axis)];
    let mut scratch = vec![zero; fft.get_inplace_scratch_len()];

    for mut lane in data.lanes_mut(axis) {
        buffer
            .iter_mut()
            .zip(lane.iter())
            .for_each(|(b, v)| *b = *v);
        fft.process_with_scratch(&mut buffer, &mut scratch);
        lane.iter_mut().zip(&buffer).for_each(|(v, b)| *v = *b);
    }
}

/// One-shot forward transform of a real array
pub fn fft2(data: &Array2<f64>) -> Array2<Complex64> {
    Fft2::new(data.dim()).forward(data)
}

/// One-shot normalized inverse transform
pub fn ifft2(kmap: Array2<Complex64>) -> Array2<Complex64> {
    Fft2::new(kmap.dim()).inverse(kmap)
}

/// One-shot normalized inverse transform, real part
pub fn ifft2_real(kmap: Array2<Complex64>) -> Array2<f64> {
    Fft2::new(kmap.dim()).inverse_real(kmap)
}
