//! Gaussian random field realizations from an isotropic power spectrum
//!
//! The generator precomputes, once per template grid and spectrum, the
//! per-mode amplitude `sqrt(P(|l|) / area · (Nx·Ny)²)` on a grid that is
//! `buffer_factor` times larger than the template along each axis. Each
//! draw fills that grid with complex Gaussian modes, inverse transforms,
//! crops the central template-sized region and removes its mean.
//!
//! With `buffer_factor = 1` the field is periodic on the template. Larger
//! factors generate on a bigger patch at the same pixel scale so that the
//! cropped map does not wrap around at its edges.
//!
//! The generator holds no per-draw state; it is `Sync`, and concurrent
//! callers each pass their own RNG to [`GrfGenerator::get_map_with_rng`].

use ndarray::{s, Array2};
use rand::Rng;
use rand_distr::StandardNormal;
use thiserror::Error;

use crate::algo::spline::{Spline, SplineError};
use crate::fourier::{Complex64, Fft2, FourierCoordinates};
use crate::map::{FlatMap, MapError, PixelGrid};
use crate::spectrum::Spectrum1D;

/// Modes below this |l| carry no power
pub const MIN_ELL: f64 = 2.0;

#[derive(Error, Debug)]
pub enum GrfError {
    #[error("Invalid grid: {0}")]
    Map(#[from] MapError),

    #[error("Power spectrum spline failed: {0}")]
    Spline(#[from] SplineError),
}

/// Evaluate a power spectrum on a mode grid with no power outside
/// `[MIN_ELL, max(ℓ)]`.
///
/// Negative spectrum values are clamped to zero before the cubic fit, and
/// the evaluated template is clamped again since the cubic can undershoot
/// between steeply falling samples.
pub fn clamped_power_template(
    mod_l_map: &Array2<f64>,
    spectrum: &Spectrum1D,
) -> Result<Array2<f64>, SplineError> {
    let clamped = spectrum.clamped_non_negative();
    let spline = Spline::cubic(clamped.ell(), clamped.values())?;
    let ell_max = spectrum.max_ell();

    Ok(mod_l_map.mapv(|l| {
        if l < MIN_ELL || l > ell_max {
            0.0
        } else {
            spline.evaluate(l).max(0.0)
        }
    }))
}

/// Reusable generator of GRF realizations on one template grid.
pub struct GrfGenerator {
    template: PixelGrid,
    buffer_factor: usize,
    coords: FourierCoordinates,
    amplitude: Array2<f64>,
    fft: Fft2,
}

impl GrfGenerator {
    /// Build a generator.
    ///
    /// # Arguments
    /// * `template` - Grid of the maps to produce
    /// * `spectrum` - Dimensionless C_ℓ
    /// * `buffer_factor` - Generation grid is this many times larger per axis (≥ 1)
    pub fn new(
        template: &PixelGrid,
        spectrum: &Spectrum1D,
        buffer_factor: usize,
    ) -> Result<Self, GrfError> {
        let buffered = template.buffered(buffer_factor)?;
        let coords = FourierCoordinates::new(&buffered);

        let power = clamped_power_template(coords.mod_l_map(), spectrum)?;
        let n_pix = buffered.pixel_count() as f64;
        let norm = n_pix * n_pix / buffered.area();
        let amplitude = power.mapv(|p| (p * norm).sqrt());

        log::debug!(
            "GRF generator: template {}, buffer factor {}, generation grid {}, {} spectrum samples up to ell={}",
            template,
            buffer_factor,
            buffered,
            spectrum.len(),
            spectrum.max_ell()
        );

        Ok(Self {
            template: *template,
            buffer_factor,
            fft: Fft2::new(buffered.shape()),
            coords,
            amplitude,
        })
    }

    /// Generator for maps shaped like `map`
    pub fn from_map<M: FlatMap>(
        map: &M,
        spectrum: &Spectrum1D,
        buffer_factor: usize,
    ) -> Result<Self, GrfError> {
        Self::new(&map.grid(), spectrum, buffer_factor)
    }

    pub fn buffer_factor(&self) -> usize {
        self.buffer_factor
    }

    /// Grid of the returned realizations
    pub fn template(&self) -> &PixelGrid {
        &self.template
    }

    /// Mode coordinates of the (buffered) generation grid
    pub fn fourier_coordinates(&self) -> &FourierCoordinates {
        &self.coords
    }

    /// Per-mode amplitude `sqrt(power_per_mode)` on the generation grid
    pub fn amplitude(&self) -> &Array2<f64> {
        &self.amplitude
    }

    /// Shape `(ny, nx)` of every realization
    pub fn output_shape(&self) -> (usize, usize) {
        self.template.shape()
    }

    /// Draw a realization using the thread-local RNG.
    pub fn get_map(&self, step_filter_ell: Option<f64>) -> Array2<f64> {
        self.get_map_with_rng(&mut rand::thread_rng(), step_filter_ell)
    }

    /// Draw a realization from `rng`.
    ///
    /// # Arguments
    /// * `rng` - Source of the two standard-normal fields
    /// * `step_filter_ell` - If given, modes with |l| above it are zeroed
    ///
    /// # Returns
    /// Zero-mean real map of the template shape
    pub fn get_map_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        step_filter_ell: Option<f64>,
    ) -> Array2<f64> {
        let mut kmap = self.amplitude.mapv(|a| {
            let re: f64 = rng.sample(StandardNormal);
            let im: f64 = rng.sample(StandardNormal);
            Complex64::new(a * re, a * im)
        });

        if let Some(ell) = step_filter_ell {
            kmap.zip_mut_with(self.coords.mod_l_map(), |k, &l| {
                if l > ell {
                    *k = Complex64::new(0.0, 0.0);
                }
            });
        }

        let full = self.fft.inverse_real(kmap);

        // Floor division: even buffer factors crop off-centre.
        let (ny, nx) = self.template.shape();
        let offset = (self.buffer_factor - 1) / 2;
        let (oy, ox) = (offset * ny, offset * nx);
        let mut data = full.slice(s![oy..oy + ny, ox..ox + nx]).to_owned();

        let mean = data.mean().unwrap_or(0.0);
        data -= mean;
        data
    }

    /// Overwrite the pixels of `map` with a fresh realization.
    pub fn fill_map<M: FlatMap, R: Rng + ?Sized>(
        &self,
        map: &mut M,
        rng: &mut R,
        step_filter_ell: Option<f64>,
    ) -> Result<(), MapError> {
        if map.grid().shape() != self.output_shape() {
            return Err(MapError::ShapeMismatch {
                expected: self.output_shape(),
                actual: map.grid().shape(),
            });
        }
        let realization = self.get_map_with_rng(rng, step_filter_ell);
        map.data_mut().assign(&realization);
        Ok(())
    }
}
