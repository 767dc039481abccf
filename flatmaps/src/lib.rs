//! Fourier-domain analysis primitives for flat-sky CMB maps
//!
//! This crate maps the geometry of a pixelized sky patch onto Fourier-mode
//! coordinates and builds on them to simulate Gaussian random fields from
//! a power spectrum, decompose polarization into E/B modes, filter and
//! beam-deconvolve maps, and construct beam, noise and apodization
//! templates.

pub mod algo;
pub mod fourier;
pub mod grf;
pub mod map;
pub mod noise;
pub mod spectrum;
pub mod transforms;
pub mod units;
pub mod window;

// Re-exports for easier access
pub use fourier::{fourier_mask, make_template, FourierCoordinates, MaskBounds};
pub use grf::{GrfError, GrfGenerator};
pub use map::{FlatMap, LiteMap, MapError, PixelGrid};
pub use noise::{white_noise_2d, BeamNoiseModel, BeamSpec, NoiseConfig};
pub use spectrum::{Spectrum1D, SpectrumError};
pub use transforms::{deconvolve_beam, step_function_filter, take_div, tqu_to_fourier_teb};
pub use window::{cosine_window, ApodizationConfig};
