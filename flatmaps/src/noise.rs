//! Beam and instrument-noise power templates on a mode grid
//!
//! Noise levels come in the usual µK·arcmin and are converted to the same
//! dimensionless power-per-mode units as the GRF spectra by dividing by
//! TCMB². Each channel's template is beam-deconvolved:
//!
//! ```text
//! N(l) = N_white · (1 + atm(l)) / filt(l)
//! N_white = (π / (180·60))² · σ² / TCMB²
//! atm(l) = (lknee / |l|)^(−alpha) for |l| > 0, 0 at |l| = 0, absent if lknee = 0
//! ```
//!
//! Where a tabulated beam or noise curve does not cover a mode, the
//! template is +inf there: infinite noise marks the mode as unusable.

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

use crate::algo::interp::{InterpError, LinearInterpolator};
use crate::spectrum::Spectrum1D;
use crate::units::{arcmin_to_radians, TCMB_MICROKELVIN};

#[derive(Error, Debug)]
pub enum NoiseError {
    #[error("{what} has {got} entries but there are {expected} noise channels")]
    ChannelCountMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Interpolation table rejected: {0}")]
    Interp(#[from] InterpError),

    #[error("Beam FWHM must be non-negative and finite, got {0} arcmin")]
    InvalidFwhm(f64),
}

/// Per-call noise model parameters.
///
/// `None` for `lknees` means no atmospheric term on any channel; `None` for
/// `alphas` means alpha = 1 on every channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// CMB temperature in µK used to make power dimensionless
    pub tcmb: f64,
    /// Atmospheric knee multipole per channel
    pub lknees: Option<Vec<f64>>,
    /// Atmospheric spectral index per channel
    pub alphas: Option<Vec<f64>>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            tcmb: TCMB_MICROKELVIN,
            lknees: None,
            alphas: None,
        }
    }
}

/// Instrument beam description
#[derive(Debug, Clone)]
pub enum BeamSpec {
    /// Gaussian beam of the given full width at half maximum
    Gaussian { fwhm_arcmin: f64 },
    /// Tabulated (ℓ, transfer) pairs, linearly interpolated
    Table(Spectrum1D),
}

/// Standard deviation in radians of a Gaussian beam with the given FWHM.
pub fn gaussian_sigma(fwhm_arcmin: f64) -> f64 {
    arcmin_to_radians(fwhm_arcmin) / (8.0 * 2.0f64.ln()).sqrt()
}

/// White-noise power per mode for a map depth in µK·arcmin.
pub fn white_noise_power(noise_uk_arcmin: f64, tcmb: f64) -> f64 {
    let arcmin = PI / (180.0 * 60.0);
    arcmin * arcmin * noise_uk_arcmin * noise_uk_arcmin / (tcmb * tcmb)
}

/// Multiplicative atmospheric excess `(lknee / |l|)^(−alpha)`.
///
/// The zero mode contributes nothing, and `lknee ≤ 0` disables the term.
pub fn atmospheric_factor(mod_l_map: &Array2<f64>, lknee: f64, alpha: f64) -> Array2<f64> {
    if lknee <= 0.0 {
        return Array2::zeros(mod_l_map.dim());
    }
    mod_l_map.mapv(|l| {
        if l > 0.0 {
            (lknee / l).powf(-alpha)
        } else {
            0.0
        }
    })
}

/// Beam filter on the mode grid.
///
/// Gaussian beams give `exp(−|l|² σ²)`. Tabulated beams are linearly
/// interpolated with 0 outside the table, so dividing by the filter there
/// yields +inf.
pub fn beam_filter(beam: &BeamSpec, mod_l_map: &Array2<f64>) -> Result<Array2<f64>, NoiseError> {
    match beam {
        BeamSpec::Gaussian { fwhm_arcmin } => {
            if !fwhm_arcmin.is_finite() || *fwhm_arcmin < 0.0 {
                return Err(NoiseError::InvalidFwhm(*fwhm_arcmin));
            }
            let sigma = gaussian_sigma(*fwhm_arcmin);
            Ok(mod_l_map.mapv(|l| (-(l * l) * sigma * sigma).exp()))
        }
        BeamSpec::Table(table) => {
            let interp =
                LinearInterpolator::new(table.ell().to_vec(), table.values().to_vec(), 0.0)?;
            Ok(interp.eval_grid(mod_l_map))
        }
    }
}

/// Beam-deconvolved noise templates for a set of channels on one mode grid.
#[derive(Debug, Clone)]
pub struct BeamNoiseModel {
    mod_l_map: Array2<f64>,
    filter: Array2<f64>,
    config: NoiseConfig,
}

impl BeamNoiseModel {
    pub fn new(
        beam: &BeamSpec,
        mod_l_map: &Array2<f64>,
        config: NoiseConfig,
    ) -> Result<Self, NoiseError> {
        let filter = beam_filter(beam, mod_l_map)?;
        let uncovered = filter.iter().filter(|&&f| f == 0.0).count();
        if uncovered > 0 {
            log::debug!(
                "beam filter is zero on {} of {} modes; noise there will be infinite",
                uncovered,
                filter.len()
            );
        }
        Ok(Self {
            mod_l_map: mod_l_map.clone(),
            filter,
            config,
        })
    }

    pub fn beam_filter(&self) -> &Array2<f64> {
        &self.filter
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Noise template for one channel from its white level and atmosphere.
    pub fn channel_noise(&self, noise_uk_arcmin: f64, lknee: f64, alpha: f64) -> Array2<f64> {
        let white = white_noise_power(noise_uk_arcmin, self.config.tcmb);
        let atm = atmospheric_factor(&self.mod_l_map, lknee, alpha);

        let mut out = Array2::zeros(self.mod_l_map.dim());
        Zip::from(&mut out)
            .and(&atm)
            .and(&self.filter)
            .for_each(|o, &a, &f| {
                // Uncovered modes are unusable even for a noiseless channel
                *o = if f == 0.0 {
                    f64::INFINITY
                } else {
                    white * (a + 1.0) / f
                };
            });
        out
    }

    /// Noise templates for every channel.
    ///
    /// # Arguments
    /// * `noise_levels` - Map depth per channel in µK·arcmin
    /// * `noise_tables` - Optional per-channel (ℓ, N_ℓ) tables; a `Some`
    ///   entry replaces the white/atmospheric model for that channel and is
    ///   linearly interpolated with +inf outside its range
    pub fn noise_power(
        &self,
        noise_levels: &[f64],
        noise_tables: Option<&[Option<Spectrum1D>]>,
    ) -> Result<Vec<Array2<f64>>, NoiseError> {
        let n = noise_levels.len();
        let lknees = per_channel("lknees", self.config.lknees.as_deref(), n, 0.0)?;
        let alphas = per_channel("alphas", self.config.alphas.as_deref(), n, 1.0)?;
        if let Some(tables) = noise_tables {
            if tables.len() != n {
                return Err(NoiseError::ChannelCountMismatch {
                    what: "noise_tables",
                    expected: n,
                    got: tables.len(),
                });
            }
        }

        let mut out = Vec::with_capacity(n);
        for (ch, &level) in noise_levels.iter().enumerate() {
            let table = noise_tables.and_then(|t| t[ch].as_ref());
            let template = match table {
                Some(table) => {
                    let interp = LinearInterpolator::new(
                        table.ell().to_vec(),
                        table.values().to_vec(),
                        f64::INFINITY,
                    )?;
                    interp.eval_grid(&self.mod_l_map)
                }
                None => self.channel_noise(level, lknees[ch], alphas[ch]),
            };
            out.push(template);
        }
        Ok(out)
    }
}

fn per_channel(
    what: &'static str,
    values: Option<&[f64]>,
    n: usize,
    default: f64,
) -> Result<Vec<f64>, NoiseError> {
    match values {
        None => Ok(vec![default; n]),
        Some(v) if v.len() == n => Ok(v.to_vec()),
        Some(v) => Err(NoiseError::ChannelCountMismatch {
            what,
            expected: n,
            got: v.len(),
        }),
    }
}

/// One-shot: beam-deconvolved noise power per channel.
pub fn white_noise_2d(
    noise_levels: &[f64],
    beam: &BeamSpec,
    mod_l_map: &Array2<f64>,
    config: &NoiseConfig,
    noise_tables: Option<&[Option<Spectrum1D>]>,
) -> Result<Vec<Array2<f64>>, NoiseError> {
    BeamNoiseModel::new(beam, mod_l_map, config.clone())?.noise_power(noise_levels, noise_tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn modl() -> Array2<f64> {
        Array2::from_shape_vec((2, 3), vec![0.0, 100.0, 500.0, 1000.0, 2000.0, 4000.0]).unwrap()
    }

    #[test]
    fn test_gaussian_sigma() {
        let expected = 1.4 * PI / 60.0 / 180.0 / (8.0 * 2.0f64.ln()).sqrt();
        assert_relative_eq!(gaussian_sigma(1.4), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_white_noise_matches_unit_conversion() {
        let n = white_noise_power(10.0, TCMB_MICROKELVIN);
        let expected = (PI / 10800.0).powi(2) * 100.0 / TCMB_MICROKELVIN.powi(2);
        assert_relative_eq!(n, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_white_only_gaussian_beam() {
        let config = NoiseConfig::default();
        let beam = BeamSpec::Gaussian { fwhm_arcmin: 1.4 };
        let out = white_noise_2d(&[10.0, 20.0], &beam, &modl(), &config, None).unwrap();
        assert_eq!(out.len(), 2);

        let sigma = gaussian_sigma(1.4);
        let white = white_noise_power(10.0, config.tcmb);
        for (v, l) in out[0].iter().zip(modl().iter()) {
            let expected = white / (-(l * l) * sigma * sigma).exp();
            assert_relative_eq!(*v, expected, max_relative = 1e-12);
        }
        // Zero mode is not affected by the beam
        assert_relative_eq!(out[0][[0, 0]], white, max_relative = 1e-12);
        assert_relative_eq!(out[1][[0, 0]], 4.0 * white, max_relative = 1e-12);
    }

    #[test]
    fn test_atmosphere_term() {
        let config = NoiseConfig {
            lknees: Some(vec![3000.0]),
            alphas: Some(vec![-4.0]),
            ..Default::default()
        };
        let beam = BeamSpec::Gaussian { fwhm_arcmin: 0.0 };
        let out = white_noise_2d(&[10.0], &beam, &modl(), &config, None).unwrap();
        let white = white_noise_power(10.0, config.tcmb);

        // |l| = 0 gets no atmospheric contribution
        assert_relative_eq!(out[0][[0, 0]], white, max_relative = 1e-12);
        // (3000 / 1000)^4 + 1 = 82
        assert_relative_eq!(out[0][[1, 0]], 82.0 * white, max_relative = 1e-12);
    }

    #[test]
    fn test_atmospheric_factor_disabled() {
        let atm = atmospheric_factor(&modl(), 0.0, 2.0);
        assert!(atm.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tabulated_beam_out_of_range_is_infinite_noise() {
        let table = Spectrum1D::new(vec![0.0, 1000.0, 3000.0], vec![1.0, 0.5, 0.25]).unwrap();
        let out = white_noise_2d(
            &[10.0],
            &BeamSpec::Table(table),
            &modl(),
            &NoiseConfig::default(),
            None,
        )
        .unwrap();
        let white = white_noise_power(10.0, TCMB_MICROKELVIN);

        assert_relative_eq!(out[0][[1, 0]], white / 0.5, max_relative = 1e-12);
        assert_relative_eq!(out[0][[1, 1]], white / 0.375, max_relative = 1e-12);
        assert_eq!(out[0][[1, 2]], f64::INFINITY);
    }

    #[test]
    fn test_noiseless_channel_still_infinite_outside_beam_table() {
        let table = Spectrum1D::new(vec![0.0, 1000.0, 3000.0], vec![1.0, 0.5, 0.25]).unwrap();
        let out = white_noise_2d(
            &[0.0],
            &BeamSpec::Table(table),
            &modl(),
            &NoiseConfig::default(),
            None,
        )
        .unwrap();

        assert_eq!(out[0][[0, 0]], 0.0);
        assert_eq!(out[0][[1, 1]], 0.0);
        assert_eq!(out[0][[1, 2]], f64::INFINITY);
        assert!(out[0].iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_noise_table_bypasses_model() {
        let table = Spectrum1D::new(vec![50.0, 1500.0], vec![1.0, 3.0]).unwrap();
        let tables = vec![None, Some(table)];
        let beam = BeamSpec::Gaussian { fwhm_arcmin: 1.0 };
        let out = white_noise_2d(
            &[10.0, 10.0],
            &beam,
            &modl(),
            &NoiseConfig::default(),
            Some(&tables),
        )
        .unwrap();

        assert!(out[0].iter().all(|v| v.is_finite()));
        assert_eq!(out[1][[0, 0]], f64::INFINITY);
        assert_relative_eq!(out[1][[1, 0]], 1.0 + 2.0 * 950.0 / 1450.0, max_relative = 1e-12);
        assert_eq!(out[1][[1, 1]], f64::INFINITY);
    }

    #[test]
    fn test_channel_count_mismatch() {
        let config = NoiseConfig {
            lknees: Some(vec![1.0, 2.0]),
            ..Default::default()
        };
        let err = white_noise_2d(
            &[10.0],
            &BeamSpec::Gaussian { fwhm_arcmin: 1.0 },
            &modl(),
            &config,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NoiseError::ChannelCountMismatch {
                what: "lknees",
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = NoiseConfig {
            lknees: Some(vec![2000.0]),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: NoiseConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.tcmb, 2.7255e6);
    }
}
