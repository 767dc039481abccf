//! Fourier-space machinery for flat-sky maps
//!
//! Everything here shares one set of conventions: arrays are `[y, x]`, the
//! zero mode lives at index `(0, 0)`, and the inverse transform carries the
//! `1/(Nx·Ny)` factor.

pub mod fft;
pub mod grid;
pub mod mask;
pub mod template;

pub use fft::{fft2, ifft2, ifft2_real, Fft2};
pub use grid::{fft_freq, FourierCoordinates};
pub use mask::{fourier_mask, MaskBounds};
pub use rustfft::num_complex::Complex64;
pub use template::{make_template, make_template_with_degree, DEFAULT_SPLINE_DEGREE};
