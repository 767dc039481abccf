//! Fourier-space operations on real maps
//!
//! All routines take `[y, x]` arrays on the grid described by a
//! [`FourierCoordinates`] (or its |l| map) and use the transform pair in
//! [`crate::fourier::fft`].

use ndarray::{Array2, Zip};
use thiserror::Error;

use crate::algo::spline::SplineError;
use crate::fourier::{make_template, Complex64, Fft2, FourierCoordinates};
use crate::map::FlatMap;
use crate::spectrum::Spectrum1D;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Beam template spline failed: {0}")]
    Spline(#[from] SplineError),
}

fn check_shape(
    what: &'static str,
    array: &Array2<f64>,
    expected: (usize, usize),
) -> Result<(), TransformError> {
    if array.dim() != expected {
        return Err(TransformError::ShapeMismatch {
            what,
            expected,
            actual: array.dim(),
        });
    }
    Ok(())
}

/// Divergence of the vector field `(vec_x, vec_y)` via spectral derivatives:
/// `Re[ifft(i·(lx·F{vec_x} + ly·F{vec_y}))]`.
pub fn take_div(
    vec_x: &Array2<f64>,
    vec_y: &Array2<f64>,
    coords: &FourierCoordinates,
) -> Result<Array2<f64>, TransformError> {
    let shape = coords.shape();
    check_shape("vec_x", vec_x, shape)?;
    check_shape("vec_y", vec_y, shape)?;

    let fft = Fft2::new(shape);
    let mut kx = fft.forward(vec_x);
    let ky = fft.forward(vec_y);

    Zip::from(&mut kx)
        .and(&ky)
        .and(coords.lx_map())
        .and(coords.ly_map())
        .for_each(|fx, &fy, &lx, &ly| {
            *fx = (*fx * lx + fy * ly) * Complex64::i();
        });

    Ok(fft.inverse_real(kx))
}

/// Fourier-space temperature and E/B polarization modes
#[derive(Debug, Clone)]
pub struct FourierTeb {
    pub t: Array2<Complex64>,
    pub e: Array2<Complex64>,
    pub b: Array2<Complex64>,
}

/// Transform Stokes T/Q/U maps and rotate Q/U into E/B with the mode angle.
///
/// `E = Q cos 2θ + U sin 2θ`, `B = −Q sin 2θ + U cos 2θ`. The results are
/// left in Fourier space.
pub fn tqu_to_fourier_teb(
    t_map: &Array2<f64>,
    q_map: &Array2<f64>,
    u_map: &Array2<f64>,
    coords: &FourierCoordinates,
) -> Result<FourierTeb, TransformError> {
    let shape = coords.shape();
    check_shape("T", t_map, shape)?;
    check_shape("Q", q_map, shape)?;
    check_shape("U", u_map, shape)?;

    let fft = Fft2::new(shape);
    let t = fft.forward(t_map);
    let fq = fft.forward(q_map);
    let fu = fft.forward(u_map);

    let mut e = Array2::zeros(shape);
    let mut b = Array2::zeros(shape);
    Zip::from(&mut e)
        .and(&mut b)
        .and(&fq)
        .and(&fu)
        .and(coords.theta_map())
        .for_each(|e, b, &q, &u, &theta| {
            let (sin2, cos2) = (2.0 * theta).sin_cos();
            *e = q * cos2 + u * sin2;
            *b = -q * sin2 + u * cos2;
        });

    Ok(FourierTeb { t, e, b })
}

/// Low-pass filter: zero every mode with |l| > `ell` and return to real space.
pub fn step_function_filter(
    data: &Array2<f64>,
    mod_l_map: &Array2<f64>,
    ell: f64,
) -> Result<Array2<f64>, TransformError> {
    check_shape("map", data, mod_l_map.dim())?;

    let fft = Fft2::new(data.dim());
    let mut kmap = fft.forward(data);
    kmap.zip_mut_with(mod_l_map, |k, &l| {
        if l > ell {
            *k = Complex64::new(0.0, 0.0);
        }
    });
    Ok(fft.inverse_real(kmap))
}

/// Step-filter a copy of `map`, leaving the input untouched.
pub fn step_function_filter_map<M: FlatMap>(map: &M, ell: f64) -> Result<M, TransformError> {
    let coords = FourierCoordinates::from_map(map);
    let filtered = step_function_filter(map.data(), coords.mod_l_map(), ell)?;
    let mut out = map.clone();
    out.data_mut().assign(&filtered);
    Ok(out)
}

/// Result of dividing a map's modes by a beam template.
#[derive(Debug, Clone)]
pub struct BeamDeconvolution {
    kmap: Array2<Complex64>,
    non_finite_modes: usize,
}

impl BeamDeconvolution {
    /// Deconvolved modes, still in Fourier space
    pub fn fourier(&self) -> &Array2<Complex64> {
        &self.kmap
    }

    pub fn into_fourier(self) -> Array2<Complex64> {
        self.kmap
    }

    /// Deconvolved map back in real space
    pub fn into_real(self) -> Array2<f64> {
        let fft = Fft2::new(self.kmap.dim());
        fft.inverse_real(self.kmap)
    }

    /// Number of modes that came out infinite or NaN
    pub fn non_finite_modes(&self) -> usize {
        self.non_finite_modes
    }
}

/// Divide the modes of `data` by the cubic-spline template of `beam`.
///
/// Beam values at or near zero blow the affected modes up to inf/NaN. The
/// arithmetic is kept as is; the count is reported on the result and logged.
pub fn deconvolve_beam(
    data: &Array2<f64>,
    mod_l_map: &Array2<f64>,
    beam: &Spectrum1D,
) -> Result<BeamDeconvolution, TransformError> {
    check_shape("map", data, mod_l_map.dim())?;

    let beam_template = make_template(beam.ell(), beam.values(), mod_l_map)?;
    let mut kmap = Fft2::new(data.dim()).forward(data);
    kmap.zip_mut_with(&beam_template, |k, &b| *k /= b);

    let non_finite_modes = kmap
        .iter()
        .filter(|k| !k.re.is_finite() || !k.im.is_finite())
        .count();
    if non_finite_modes > 0 {
        log::warn!(
            "beam deconvolution produced {} non-finite modes out of {}",
            non_finite_modes,
            kmap.len()
        );
    }

    Ok(BeamDeconvolution {
        kmap,
        non_finite_modes,
    })
}
