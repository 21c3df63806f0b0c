//! # ngrave Core
//!
//! Core types shared by the ngrave crates: planar geometry, length units
//! and engraving resolution parsing.

pub mod error;
pub mod types;
pub mod units;

pub use error::{UnitError, UnitResult};
pub use types::Point;
pub use units::{Length, LengthUnit, Resolution, MM_PER_INCH};
