//! Flat-sky pixel grids and the map container contract
//!
//! A [`PixelGrid`] is the geometry every Fourier-space routine derives its
//! mode coordinates from. Any map type that can hand out its grid and a 2D
//! array of pixel values implements [`FlatMap`]; [`LiteMap`] is the plain
//! owned implementation used throughout the crate and its tests.
//!
//! Arrays are always indexed `[row, col] = [y, x]`, so a grid with `nx`
//! columns and `ny` rows maps to an `Array2` of shape `(ny, nx)`.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while constructing grids and maps
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Grid dimensions must be positive, got nx={nx}, ny={ny}")]
    InvalidDimensions { nx: usize, ny: usize },

    #[error("Pixel scales must be positive and finite, got x={x}, y={y}")]
    InvalidPixelScale { x: f64, y: f64 },

    #[error("Data shape {actual:?} does not match grid shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Buffer factor must be at least 1")]
    InvalidBufferFactor,
}

/// Geometry of a rectangular flat-sky pixelization.
///
/// Pixel scales are in radians per pixel. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelGrid {
    nx: usize,
    ny: usize,
    pix_scale_x: f64,
    pix_scale_y: f64,
}

impl PixelGrid {
    /// Create a validated pixel grid.
    ///
    /// # Arguments
    /// * `nx` - Number of columns (x axis)
    /// * `ny` - Number of rows (y axis)
    /// * `pix_scale_x` - Column spacing in radians
    /// * `pix_scale_y` - Row spacing in radians
    pub fn new(nx: usize, ny: usize, pix_scale_x: f64, pix_scale_y: f64) -> Result<Self, MapError> {
        if nx == 0 || ny == 0 {
            return Err(MapError::InvalidDimensions { nx, ny });
        }
        let valid = |s: f64| s.is_finite() && s > 0.0;
        if !valid(pix_scale_x) || !valid(pix_scale_y) {
            return Err(MapError::InvalidPixelScale {
                x: pix_scale_x,
                y: pix_scale_y,
            });
        }
        Ok(Self {
            nx,
            ny,
            pix_scale_x,
            pix_scale_y,
        })
    }

    /// Square-pixel convenience constructor
    pub fn square(nx: usize, ny: usize, pix_scale: f64) -> Result<Self, MapError> {
        Self::new(nx, ny, pix_scale, pix_scale)
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn pix_scale_x(&self) -> f64 {
        self.pix_scale_x
    }

    pub fn pix_scale_y(&self) -> f64 {
        self.pix_scale_y
    }

    /// Array shape `(ny, nx)` for data on this grid
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.nx * self.ny
    }

    /// Solid angle covered by the grid in steradians (flat-sky)
    pub fn area(&self) -> f64 {
        self.pixel_count() as f64 * self.pix_scale_x * self.pix_scale_y
    }

    /// Grid covering `factor` times the extent along each axis at the same
    /// pixel scale.
    pub fn buffered(&self, factor: usize) -> Result<Self, MapError> {
        if factor == 0 {
            return Err(MapError::InvalidBufferFactor);
        }
        Self::new(
            self.nx * factor,
            self.ny * factor,
            self.pix_scale_x,
            self.pix_scale_y,
        )
    }

    /// Pixel-centre coordinates relative to the grid centre.
    pub fn real_coordinates(&self) -> RealCoordinates {
        RealCoordinates::from_grid(self)
    }
}

impl fmt::Display for PixelGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}x{} @ ({:.3e}, {:.3e}) rad/pix",
            self.nx, self.ny, self.pix_scale_x, self.pix_scale_y
        )
    }
}

/// Real-space coordinates of each pixel centre, in radians from the grid centre
#[derive(Debug, Clone)]
pub struct RealCoordinates {
    /// Column coordinates, length `nx`
    pub x: Array1<f64>,
    /// Row coordinates, length `ny`
    pub y: Array1<f64>,
    /// `x` broadcast over rows, shape `(ny, nx)`
    pub x_map: Array2<f64>,
    /// `y` broadcast over columns, shape `(ny, nx)`
    pub y_map: Array2<f64>,
    /// Distance from the centre, shape `(ny, nx)`
    pub mod_r_map: Array2<f64>,
}

impl RealCoordinates {
    fn from_grid(grid: &PixelGrid) -> Self {
        let axis = |n: usize, scale: f64| {
            Array1::from_shape_fn(n, |i| (i as f64 - n as f64 / 2.0 + 0.5) * scale)
        };
        let x = axis(grid.nx, grid.pix_scale_x);
        let y = axis(grid.ny, grid.pix_scale_y);

        let shape = grid.shape();
        let x_map = Array2::from_shape_fn(shape, |(_, i)| x[i]);
        let y_map = Array2::from_shape_fn(shape, |(j, _)| y[j]);
        let mod_r_map = Array2::from_shape_fn(shape, |(j, i)| x[i].hypot(y[j]));

        Self {
            x,
            y,
            x_map,
            y_map,
            mod_r_map,
        }
    }
}

/// Capability contract for flat-sky map containers.
///
/// Cloning a map must produce an independent copy of its pixel data.
pub trait FlatMap: Clone {
    /// Geometry of the map
    fn grid(&self) -> PixelGrid;

    /// Pixel values, shape `(ny, nx)`
    fn data(&self) -> &Array2<f64>;

    /// Mutable pixel values, shape `(ny, nx)`
    fn data_mut(&mut self) -> &mut Array2<f64>;

    fn nx(&self) -> usize {
        self.grid().nx()
    }

    fn ny(&self) -> usize {
        self.grid().ny()
    }

    fn pix_scale_x(&self) -> f64 {
        self.grid().pix_scale_x()
    }

    fn pix_scale_y(&self) -> f64 {
        self.grid().pix_scale_y()
    }
}

/// Owned map: a pixel grid plus its data array
#[derive(Debug, Clone, PartialEq)]
pub struct LiteMap {
    grid: PixelGrid,
    data: Array2<f64>,
}

impl LiteMap {
    /// Wrap an existing array, checking it matches the grid shape.
    pub fn new(grid: PixelGrid, data: Array2<f64>) -> Result<Self, MapError> {
        if data.dim() != grid.shape() {
            return Err(MapError::ShapeMismatch {
                expected: grid.shape(),
                actual: data.dim(),
            });
        }
        Ok(Self { grid, data })
    }

    /// Zero-filled map on `grid`
    pub fn zeros(grid: PixelGrid) -> Self {
        Self {
            grid,
            data: Array2::zeros(grid.shape()),
        }
    }

    /// Consume the map and return its data
    pub fn into_data(self) -> Array2<f64> {
        self.data
    }
}

impl FlatMap for LiteMap {
    fn grid(&self) -> PixelGrid {
        self.grid
    }

    fn data(&self) -> &Array2<f64> {
        &self.data
    }

    fn data_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }
}
