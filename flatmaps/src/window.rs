//! Cosine-taper apodization windows
//!
//! The window is separable: each axis ramps from 0 to 1 as a half cosine
//! over `len_apod` pixels just inside a `pad`-pixel border, stays at 1 in
//! the interior and ramps back down symmetrically. The `pad` border itself
//! is exactly zero on all four sides.

use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::map::FlatMap;

/// Taper parameters in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApodizationConfig {
    /// Length of each cosine ramp
    pub len_apod: usize,
    /// Width of the zeroed border
    pub pad: usize,
}

impl Default for ApodizationConfig {
    fn default() -> Self {
        Self {
            len_apod: 30,
            pad: 0,
        }
    }
}

/// 1D taper of length `n`.
fn axis_taper(n: usize, len_apod: usize, pad: usize) -> Array1<f64> {
    let mut taper = Array1::ones(n);
    if len_apod == 0 {
        return taper;
    }

    let ramp = |r: f64| 0.5 * (1.0 - (PI * r / len_apod as f64).cos());
    let upper_start = n as isize - 1 - len_apod as isize - pad as isize;
    for i in pad..n.saturating_sub(pad) {
        if i <= len_apod + pad {
            taper[i] = ramp((i - pad) as f64);
        }
        if i as isize >= upper_start {
            taper[i] = ramp((n - 1 - i - pad) as f64);
        }
    }
    taper
}

/// Separable cosine window of shape `(ny, nx)`.
pub fn cosine_window(nx: usize, ny: usize, config: ApodizationConfig) -> Array2<f64> {
    let ApodizationConfig { len_apod, pad } = config;
    let wx = axis_taper(nx, len_apod, pad);
    let wy = axis_taper(ny, len_apod, pad);

    let mut window = Array2::from_shape_fn((ny, nx), |(j, i)| wy[j] * wx[i]);

    let (py, px) = (pad.min(ny), pad.min(nx));
    window.slice_mut(s![..py, ..]).fill(0.0);
    window.slice_mut(s![ny - py.., ..]).fill(0.0);
    window.slice_mut(s![.., ..px]).fill(0.0);
    window.slice_mut(s![.., nx - px..]).fill(0.0);
    window
}

/// Window on the grid of `template`, returned as an independent copy of it.
pub fn cosine_window_map<M: FlatMap>(template: &M, config: ApodizationConfig) -> M {
    let mut window = template.clone();
    window
        .data_mut()
        .assign(&cosine_window(template.nx(), template.ny(), config));
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{LiteMap, PixelGrid};
    use approx::assert_relative_eq;

    #[test]
    fn test_border_zero_and_interior_one() {
        let (nx, ny) = (64, 48);
        let config = ApodizationConfig { len_apod: 8, pad: 3 };
        let w = cosine_window(nx, ny, config);
        assert_eq!(w.dim(), (ny, nx));

        for ((j, i), &v) in w.indexed_iter() {
            let in_border = j < 3 || i < 3 || j >= ny - 3 || i >= nx - 3;
            if in_border {
                assert_eq!(v, 0.0, "border pixel ({j}, {i})");
            }
            let edge = 8 + 3;
            let interior = j > edge && i > edge && j < ny - 1 - edge && i < nx - 1 - edge;
            if interior {
                assert_eq!(v, 1.0, "interior pixel ({j}, {i})");
            }
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_taper_is_symmetric_ramp() {
        let taper = axis_taper(40, 10, 2);
        for i in 0..40 {
            assert_relative_eq!(taper[i], taper[39 - i], epsilon = 1e-12);
        }
        assert_eq!(taper[2], 0.0);
        assert_relative_eq!(taper[7], 0.5, epsilon = 1e-12);
        assert_relative_eq!(taper[12], 1.0, epsilon = 1e-12);
        for i in 3..12 {
            assert!(taper[i] > taper[i - 1]);
        }
    }

    #[test]
    fn test_no_apodization_length_gives_flat_window() {
        let w = cosine_window(10, 6, ApodizationConfig { len_apod: 0, pad: 1 });
        assert_eq!(w[[3, 5]], 1.0);
        assert_eq!(w[[0, 5]], 0.0);
        assert_eq!(w[[3, 9]], 0.0);
    }

    #[test]
    fn test_window_map_copies_template() {
        let grid = PixelGrid::new(20, 12, 0.001, 0.001).unwrap();
        let template = LiteMap::new(grid, Array2::from_elem((12, 20), 7.0)).unwrap();
        let window = cosine_window_map(&template, ApodizationConfig { len_apod: 4, pad: 1 });

        assert_eq!(window.grid(), grid);
        assert_eq!(template.data()[[0, 0]], 7.0);
        assert_eq!(window.data()[[0, 0]], 0.0);
        assert_eq!(window.data()[[6, 10]], 1.0);
    }
}
