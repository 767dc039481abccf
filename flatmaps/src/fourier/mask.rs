//! Binary masks over Fourier modes

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use super::grid::FourierCoordinates;

/// Optional cuts applied by [`fourier_mask`]. All `None` keeps every mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskBounds {
    /// Remove modes with |l| ≤ lmin
    pub lmin: Option<f64>,
    /// Remove modes with |l| ≥ lmax
    pub lmax: Option<f64>,
    /// Remove columns with |lx| < lxcut
    pub lxcut: Option<f64>,
    /// Remove rows with |ly| < lycut
    pub lycut: Option<f64>,
}

/// Build a {0, 1} mask of shape `(ny, nx)` over the mode grid.
pub fn fourier_mask(coords: &FourierCoordinates, bounds: &MaskBounds) -> Array2<u8> {
    let mut mask = Array2::<u8>::ones(coords.shape());
    let modl = coords.mod_l_map();

    if let Some(lmin) = bounds.lmin {
        mask.zip_mut_with(modl, |m, &l| {
            if l <= lmin {
                *m = 0;
            }
        });
    }
    if let Some(lmax) = bounds.lmax {
        mask.zip_mut_with(modl, |m, &l| {
            if l >= lmax {
                *m = 0;
            }
        });
    }
    if let Some(lxcut) = bounds.lxcut {
        for (mut col, lx) in mask.axis_iter_mut(Axis(1)).zip(coords.lx().iter()) {
            if lx.abs() < lxcut {
                col.fill(0);
            }
        }
    }
    if let Some(lycut) = bounds.lycut {
        for (mut row, ly) in mask.axis_iter_mut(Axis(0)).zip(coords.ly().iter()) {
            if ly.abs() < lycut {
                row.fill(0);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PixelGrid;

    fn coords() -> FourierCoordinates {
        FourierCoordinates::new(&PixelGrid::new(16, 8, 0.001, 0.002).unwrap())
    }

    #[test]
    fn test_default_is_all_ones() {
        let mask = fourier_mask(&coords(), &MaskBounds::default());
        assert_eq!(mask.dim(), (8, 16));
        assert!(mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn test_annulus() {
        let c = coords();
        let bounds = MaskBounds {
            lmin: Some(1000.0),
            lmax: Some(2500.0),
            ..Default::default()
        };
        let mask = fourier_mask(&c, &bounds);
        for (m, l) in mask.iter().zip(c.mod_l_map().iter()) {
            let expected = u8::from(*l > 1000.0 && *l < 2500.0);
            assert_eq!(*m, expected);
        }
        assert_eq!(mask[[0, 0]], 0);
    }

    #[test]
    fn test_axis_cuts_remove_rows_and_columns() {
        let c = coords();
        // lx spacing is 2π/0.016 ≈ 392.7, so the cut removes lx = 0 only
        let bounds = MaskBounds {
            lxcut: Some(100.0),
            lycut: Some(100.0),
            ..Default::default()
        };
        let mask = fourier_mask(&c, &bounds);
        assert!(mask.column(0).iter().all(|&m| m == 0));
        assert!(mask.row(0).iter().all(|&m| m == 0));
        assert_eq!(mask[[1, 1]], 1);
        assert_eq!(mask.iter().filter(|&&m| m == 1).count(), 15 * 7);
    }
}
