//! Fourier-mode coordinates of a pixel grid
//!
//! For a grid with `nx` columns of width `pix_scale_x` radians the column
//! frequencies are `lx[k] = 2π · fftfreq(nx, pix_scale_x)[k]`, in the same
//! wrap-around order the transforms in [`super::fft`] produce. The 2D maps
//! are indexed `[row, col] = [y, x]`: the row selects `ly`, the column `lx`.

use ndarray::{Array1, Array2};
use std::f64::consts::PI;

use crate::map::{FlatMap, PixelGrid};

/// Sample frequencies of an `n`-point DFT with spacing `d`.
///
/// `[0, 1, …, ⌈n/2⌉−1, −⌊n/2⌋, …, −1] / (n·d)`
pub fn fft_freq(n: usize, d: f64) -> Array1<f64> {
    let positive = (n - 1) / 2 + 1;
    let scale = 1.0 / (n as f64 * d);
    Array1::from_shape_fn(n, |k| {
        let signed = if k < positive {
            k as f64
        } else {
            k as f64 - n as f64
        };
        signed * scale
    })
}

/// Mode coordinates (lx, ly, |l|, angle) for one pixel grid.
#[derive(Debug, Clone)]
pub struct FourierCoordinates {
    grid: PixelGrid,
    lx: Array1<f64>,
    ly: Array1<f64>,
    lx_map: Array2<f64>,
    ly_map: Array2<f64>,
    mod_l_map: Array2<f64>,
    theta_map: Array2<f64>,
}

impl FourierCoordinates {
    pub fn new(grid: &PixelGrid) -> Self {
        let lx = fft_freq(grid.nx(), grid.pix_scale_x()) * (2.0 * PI);
        let ly = fft_freq(grid.ny(), grid.pix_scale_y()) * (2.0 * PI);

        let shape = grid.shape();
        let lx_map = Array2::from_shape_fn(shape, |(_, i)| lx[i]);
        let ly_map = Array2::from_shape_fn(shape, |(j, _)| ly[j]);
        let mod_l_map = Array2::from_shape_fn(shape, |(j, i)| lx[i].hypot(ly[j]));
        let theta_map = Array2::from_shape_fn(shape, |(j, i)| ly[j].atan2(lx[i]));

        Self {
            grid: *grid,
            lx,
            ly,
            lx_map,
            ly_map,
            mod_l_map,
            theta_map,
        }
    }

    /// Coordinates for the grid of an existing map
    pub fn from_map<M: FlatMap>(map: &M) -> Self {
        Self::new(&map.grid())
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Array shape `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// Column frequencies, length `nx`
    pub fn lx(&self) -> &Array1<f64> {
        &self.lx
    }

    /// Row frequencies, length `ny`
    pub fn ly(&self) -> &Array1<f64> {
        &self.ly
    }

    pub fn lx_map(&self) -> &Array2<f64> {
        &self.lx_map
    }

    pub fn ly_map(&self) -> &Array2<f64> {
        &self.ly_map
    }

    /// Mode magnitude `sqrt(lx² + ly²)`
    pub fn mod_l_map(&self) -> &Array2<f64> {
        &self.mod_l_map
    }

    /// Mode angle `atan2(ly, lx)` in radians
    pub fn theta_map(&self) -> &Array2<f64> {
        &self.theta_map
    }
}
