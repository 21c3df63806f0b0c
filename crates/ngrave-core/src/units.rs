//! Unit conversion utilities
//!
//! Handles the metric/imperial length units a job is emitted in, and the
//! resolution notations accepted for raster engraving: dots per inch, dots
//! per millimetre, or a dot pitch (the spacing between two laser dots).

use crate::error::{UnitError, UnitResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimetres in one inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Length unit of emitted coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Millimetres (G21)
    Millimeters,
    /// Inches (G20)
    Inches,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Millimeters
    }
}

impl LengthUnit {
    /// G-code word that selects this unit.
    pub fn gcode(&self) -> &'static str {
        match self {
            Self::Millimeters => "G21",
            Self::Inches => "G20",
        }
    }

    /// Short suffix used in comments.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Millimeters => "mm",
            Self::Inches => "in",
        }
    }

    /// Converts `value` expressed in `self` into `target`.
    pub fn convert(&self, value: f64, target: LengthUnit) -> f64 {
        match (self, target) {
            (Self::Millimeters, Self::Inches) => value / MM_PER_INCH,
            (Self::Inches, Self::Millimeters) => value * MM_PER_INCH,
            _ => value,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeters => write!(f, "mm"),
            Self::Inches => write!(f, "inch"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "metric" => Ok(Self::Millimeters),
            "in" | "inch" | "inches" | "imperial" => Ok(Self::Inches),
            other => Err(UnitError::UnknownUnit(other.to_string())),
        }
    }
}

/// Splits "12.5mm" into ("12.5", "mm").
fn split_quantity(input: &str) -> UnitResult<(f64, String)> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitError::Empty);
    }

    let split_at = input
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(input.len());
    // "1e" style prefixes are only exponents when followed by a digit
    let (number, unit) = input.split_at(split_at);
    let (number, unit) = match number.strip_suffix(['e', 'E']) {
        Some(stripped) => (stripped, &input[stripped.len()..]),
        None => (number, unit),
    };

    let value = number
        .parse::<f64>()
        .map_err(|_| UnitError::InvalidNumber(number.to_string()))?;
    Ok((value, unit.trim().to_lowercase()))
}

/// A length with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    /// Creates a length in millimetres.
    pub fn mm(value: f64) -> Self {
        Self {
            value,
            unit: LengthUnit::Millimeters,
        }
    }

    /// Value expressed in `unit`.
    pub fn to(&self, unit: LengthUnit) -> f64 {
        self.unit.convert(self.value, unit)
    }
}

impl FromStr for Length {
    type Err = UnitError;

    /// Parses "20mm", "2cm", "0.5in" or a bare number (millimetres).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_quantity(s)?;
        if !value.is_finite() {
            return Err(UnitError::InvalidNumber(s.trim().to_string()));
        }
        match unit.as_str() {
            "" | "mm" => Ok(Self::mm(value)),
            "cm" => Ok(Self::mm(value * 10.0)),
            "um" => Ok(Self::mm(value / 1000.0)),
            "in" | "inch" | "\"" => Ok(Self {
                value,
                unit: LengthUnit::Inches,
            }),
            other => Err(UnitError::UnknownUnit(other.to_string())),
        }
    }
}

/// Raster resolution.
///
/// Either a dot density or the pitch between neighbouring dots (the laser
/// spot diameter). Every form resolves to a physical size per source pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Dots per inch
    DotsPerInch(f64),
    /// Dots per millimetre
    DotsPerMm(f64),
    /// Distance between dots
    Pitch(Length),
}

impl Default for Resolution {
    fn default() -> Self {
        Self::DotsPerInch(508.0)
    }
}

impl Resolution {
    /// Physical size of one pixel in `unit`.
    pub fn units_per_pixel(&self, unit: LengthUnit) -> f64 {
        match self {
            Self::DotsPerInch(dpi) => LengthUnit::Inches.convert(1.0 / dpi, unit),
            Self::DotsPerMm(dpmm) => LengthUnit::Millimeters.convert(1.0 / dpmm, unit),
            Self::Pitch(length) => length.to(unit),
        }
    }

    /// Equivalent dots per inch.
    pub fn dpi(&self) -> f64 {
        1.0 / self.units_per_pixel(LengthUnit::Inches)
    }

    fn validate(self) -> UnitResult<Self> {
        let value = match self {
            Self::DotsPerInch(v) | Self::DotsPerMm(v) => v,
            Self::Pitch(length) => length.value,
        };
        if value.is_finite() && value > 0.0 {
            Ok(self)
        } else {
            Err(UnitError::NotPositive(value))
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DotsPerInch(v) => write!(f, "{}dpi", v),
            Self::DotsPerMm(v) => write!(f, "{}dpmm", v),
            Self::Pitch(length) => write!(f, "{}{}", length.value, length.unit.suffix()),
        }
    }
}

impl FromStr for Resolution {
    type Err = UnitError;

    /// Parses "508dpi", "20dpmm", "0.05mm" or "0.002in". A bare number is dpi.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_quantity(s)?;
        let resolution = match unit.as_str() {
            "" | "dpi" => Self::DotsPerInch(value),
            "dpmm" | "dots/mm" => Self::DotsPerMm(value),
            _ => Self::Pitch(s.parse::<Length>()?),
        };
        resolution.validate()
    }
}
