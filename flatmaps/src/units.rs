//! Angular units and CMB unit-conversion constants
//!
//! Pixel scales are carried around as plain `f64` radians in the hot loops;
//! this module is where arcminute inputs (beam FWHM, pixel sizes, noise
//! levels in µK·arcmin) are converted on the way in.

use uom::si::angle::{minute, radian};

/// Type alias for angles with convenient methods
pub type Angle = uom::si::f64::Angle;

/// CMB monopole temperature in µK, used to make map power dimensionless
pub const TCMB_MICROKELVIN: f64 = 2.7255e6;

/// Extension trait for the angle conversions used by flat-sky maps
pub trait AngleExt {
    /// Create angle from arcminutes
    fn from_arcminutes(arcmin: f64) -> Self;

    /// Get angle in arcminutes
    fn as_arcminutes(&self) -> f64;

    /// Create angle from radians
    fn from_radians(rad: f64) -> Self;

    /// Get angle in radians
    fn as_radians(&self) -> f64;
}

impl AngleExt for Angle {
    fn from_arcminutes(arcmin: f64) -> Self {
        Angle::new::<minute>(arcmin)
    }

    fn as_arcminutes(&self) -> f64 {
        self.get::<minute>()
    }

    fn from_radians(rad: f64) -> Self {
        Angle::new::<radian>(rad)
    }

    fn as_radians(&self) -> f64 {
        self.get::<radian>()
    }
}

/// Convert arcminutes straight to radians.
pub fn arcmin_to_radians(arcmin: f64) -> f64 {
    Angle::from_arcminutes(arcmin).as_radians()
}
