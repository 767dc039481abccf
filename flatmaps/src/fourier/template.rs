//! 2D templates from isotropic 1D functions of mode magnitude
//!
//! Fits a spline through (ℓ, F(ℓ)) and evaluates it at every |l| of a mode
//! grid. No clamping is applied here: modes outside the tabulated range get
//! the spline's extrapolation, and callers decide what that should mean.

use ndarray::Array2;

use crate::algo::spline::{Spline, SplineError};

/// Spline degree used when callers do not ask for one
pub const DEFAULT_SPLINE_DEGREE: usize = 3;

/// Evaluate the degree-`degree` spline of `(ell, values)` on `mod_l_map`.
///
/// # Arguments
/// * `ell` - Multipoles, strictly increasing
/// * `values` - Function samples at `ell`
/// * `mod_l_map` - Mode magnitude grid, any shape
/// * `degree` - Spline degree (1, 3 or 5)
///
/// # Returns
/// Array with the shape of `mod_l_map`
pub fn make_template_with_degree(
    ell: &[f64],
    values: &[f64],
    mod_l_map: &Array2<f64>,
    degree: usize,
) -> Result<Array2<f64>, SplineError> {
    let spline = Spline::new(ell, values, degree)?;
    Ok(spline.evaluate_grid(mod_l_map))
}

/// Cubic-spline template of `(ell, values)` on `mod_l_map`.
pub fn make_template(
    ell: &[f64],
    values: &[f64],
    mod_l_map: &Array2<f64>,
) -> Result<Array2<f64>, SplineError> {
    make_template_with_degree(ell, values, mod_l_map, DEFAULT_SPLINE_DEGREE)
}
