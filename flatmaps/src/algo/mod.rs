//! Numerical building blocks shared by the Fourier-space routines
//!
//! Spline fitting, linear table lookup and grid resampling. None of these
//! know about maps; they work on plain slices and `ndarray` arrays.

pub mod grid_interp;
pub mod interp;
pub mod spline;

pub use grid_interp::{interpolate_grid, GridInterpError};
pub use interp::{InterpError, LinearInterpolator};
pub use spline::{spline_interpolate, Spline, SplineError};
