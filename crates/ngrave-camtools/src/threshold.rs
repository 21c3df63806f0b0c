//! Intensity thresholding
//!
//! Converts grayscale intensity into binary occupancy. The default is a hard
//! cutoff; ordered dithering plugs in through the same [`ThresholdStrategy`]
//! trait without the raster generator knowing the difference.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Decides whether a cell with the given intensity engraves.
pub trait ThresholdStrategy: fmt::Debug + Send + Sync {
    /// `intensity` is 0..=255; `x`/`y` is the cell position in the grid.
    fn is_occupied(&self, intensity: u8, x: u32, y: u32) -> bool;
}

/// Hard cutoff: values at or above `cutoff` engrave, values below are background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedThreshold {
    cutoff: u8,
}

impl FixedThreshold {
    /// Mid-range default cutoff.
    pub const DEFAULT_CUTOFF: u8 = 128;

    pub fn new(cutoff: u8) -> Self {
        Self { cutoff }
    }

    /// Builds a threshold from a 0.0..=1.0 normalized cutoff.
    pub fn from_normalized(cutoff: f32) -> Self {
        Self::new(normalized_to_byte(cutoff))
    }

    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    /// Classifies a 0.0..=1.0 normalized intensity.
    pub fn is_occupied_normalized(&self, intensity: f32) -> bool {
        normalized_to_byte(intensity) >= self.cutoff
    }
}

impl Default for FixedThreshold {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CUTOFF)
    }
}

impl ThresholdStrategy for FixedThreshold {
    fn is_occupied(&self, intensity: u8, _x: u32, _y: u32) -> bool {
        intensity >= self.cutoff
    }
}

fn normalized_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Ordered dithering with a 4x4 Bayer matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderedDither;

impl OrderedDither {
    const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

    /// Per-cell cutoff in 8..=248.
    fn cutoff_at(x: u32, y: u32) -> u8 {
        Self::BAYER_4X4[(y % 4) as usize][(x % 4) as usize] * 16 + 8
    }
}

impl ThresholdStrategy for OrderedDither {
    fn is_occupied(&self, intensity: u8, x: u32, y: u32) -> bool {
        intensity >= Self::cutoff_at(x, y)
    }
}

/// Thresholding method selected from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Single hard cutoff
    Fixed { cutoff: u8 },
    /// Ordered dithering (Bayer 4x4)
    Bayer4x4,
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Fixed {
            cutoff: FixedThreshold::DEFAULT_CUTOFF,
        }
    }
}

impl ThresholdMethod {
    /// Instantiates the strategy.
    pub fn strategy(&self) -> Box<dyn ThresholdStrategy> {
        match self {
            Self::Fixed { cutoff } => Box::new(FixedThreshold::new(*cutoff)),
            Self::Bayer4x4 => Box::new(OrderedDither),
        }
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed { cutoff } => write!(f, "fixed cutoff {}", cutoff),
            Self::Bayer4x4 => write!(f, "Bayer 4x4"),
        }
    }
}
