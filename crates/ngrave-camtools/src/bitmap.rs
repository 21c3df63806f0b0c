//! Bitmap normalization
//!
//! Turns a decoded grayscale image into a [`Bitmap`]: a binary occupancy
//! grid with one cell per source pixel and a physical scale. The scale is
//! only recorded here; it is applied when coordinates are emitted.

use crate::error::{EngraveError, EngraveResult, ParameterError};
use crate::threshold::ThresholdStrategy;
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Image transformation parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageTransformations {
    /// Mirror image horizontally (flip around Y axis)
    pub mirror_x: bool,
    /// Mirror image vertically (flip around X axis)
    pub mirror_y: bool,
    /// Invert intensities (dark becomes light, light becomes dark)
    pub invert: bool,
    /// Trim border rows and columns with no occupied cells
    pub crop_to_content: bool,
}

impl ImageTransformations {
    /// Applies mirroring and inversion in place. Cropping happens on the
    /// occupancy grid, see [`Bitmap::crop_to_content`].
    pub fn apply(&self, image: &mut GrayImage) {
        if self.mirror_x {
            image::imageops::flip_horizontal_in_place(image);
        }
        if self.mirror_y {
            image::imageops::flip_vertical_in_place(image);
        }
        if self.invert {
            image::imageops::invert(image);
        }
    }
}

/// Rejects zero, negative and non-finite scales.
pub fn validate_scale(scale: f64) -> EngraveResult<f64> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(EngraveError::InvalidScale(scale))
    }
}

/// Binary occupancy grid with a physical scale (units per cell).
///
/// Cells are stored row-major, row 0 at the top of the source image.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    scale: f64,
    cells: Vec<bool>,
}

impl Bitmap {
    /// Creates a bitmap from row-major cells.
    pub fn new(width: u32, height: u32, scale: f64, cells: Vec<bool>) -> EngraveResult<Self> {
        let scale = validate_scale(scale)?;
        if width == 0 || height == 0 {
            return Err(EngraveError::EmptyImage { width, height });
        }
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(ParameterError::InvalidValue {
                name: "cells".to_string(),
                reason: format!(
                    "expected {} cells for {}x{}, got {}",
                    expected,
                    width,
                    height,
                    cells.len()
                ),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            scale,
            cells,
        })
    }

    /// Creates a bitmap from rows of equal length.
    pub fn from_rows(rows: &[Vec<bool>], scale: f64) -> EngraveResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len());
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ParameterError::InvalidValue {
                name: "rows".to_string(),
                reason: format!(
                    "row {} has {} cells, expected {}",
                    index,
                    row.len(),
                    width
                ),
            }
            .into());
        }
        let width = width as u32;
        let cells = rows.iter().flatten().copied().collect();
        Self::new(width, height, scale, cells)
    }

    /// Normalizes a grayscale image: one pixel maps to one cell, occupancy
    /// decided by `strategy`.
    pub fn normalize(
        image: &GrayImage,
        scale: f64,
        strategy: &dyn ThresholdStrategy,
    ) -> EngraveResult<Self> {
        let scale = validate_scale(scale)?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EngraveError::EmptyImage { width, height });
        }

        let cells = image
            .enumerate_pixels()
            .map(|(x, y, pixel)| strategy.is_occupied(pixel.0[0], x, y))
            .collect::<Vec<_>>();

        let bitmap = Self {
            width,
            height,
            scale,
            cells,
        };
        debug!(
            width,
            height,
            scale,
            occupied = bitmap.occupied_count(),
            "normalized bitmap"
        );
        Ok(bitmap)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Units per cell.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Occupancy of cell (x, y). Out-of-range cells are unoccupied.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Cells of row `y`, left to right.
    pub fn row(&self, y: u32) -> &[bool] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    /// Cells of column `x`, top to bottom.
    pub fn column(&self, x: u32) -> Vec<bool> {
        (0..self.height).map(|y| self.get(x, y)).collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// True when no cell is occupied.
    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Width and height in physical units.
    pub fn physical_size(&self) -> (f64, f64) {
        (
            self.width as f64 * self.scale,
            self.height as f64 * self.scale,
        )
    }

    /// Returns the smallest sub-grid that still holds every occupied cell.
    pub fn crop_to_content(&self) -> EngraveResult<Self> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        for y in 0..self.height {
            for (x, &cell) in self.row(y).iter().enumerate() {
                if cell {
                    let x = x as u32;
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                    min_y = min_y.min(y);
                    max_y = max_y.max(y);
                }
            }
        }

        if min_x == u32::MAX {
            return Err(EngraveError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }

        let width = max_x - min_x + 1;
        let height = max_y - min_y + 1;
        let cells = (min_y..=max_y)
            .flat_map(|y| (min_x..=max_x).map(move |x| (x, y)))
            .map(|(x, y)| self.get(x, y))
            .collect();
        debug!(
            from_width = self.width,
            from_height = self.height,
            width,
            height,
            "cropped bitmap to content"
        );
        Self::new(width, height, self.scale, cells)
    }

    /// Renders the occupancy mask: engraved cells black, background white.
    pub fn to_preview_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.get(x, y) {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}
