//! # ngrave CAM Tools
//!
//! Turns images and vector outlines into laser engraving G-code.
//!
//! ## Pipeline
//!
//! - **Bitmap Normalizer** ([`bitmap`]): grayscale image to a binary occupancy grid
//! - **Thresholding** ([`threshold`]): fixed cutoff or ordered dithering
//! - **Raster Path Generator** ([`raster`]): boustrophedon scan, one engraving move per run
//! - **Vector Tracer** ([`vector`]): polylines straight to motion events
//! - **Toolpath Emitter** ([`emitter`]): motion events to machine-specific G-code
//!
//! [`engraver`] wires the stages together behind [`BitmapEngraver`] and
//! [`VectorEngraver`].

pub mod bitmap;
pub mod emitter;
pub mod engraver;
pub mod error;
pub mod motion;
pub mod raster;
pub mod threshold;
pub mod toolpath;
pub mod vector;

// Re-export commonly used items
pub use bitmap::{Bitmap, ImageTransformations};
pub use emitter::{EmitterSettings, MachineProfile, ToolpathEmitter};
pub use engraver::{BitmapEngraver, EngravingParameters, VectorEngraver};
pub use error::{EngraveError, EngraveResult, ParameterError, ParameterResult};
pub use motion::{LaserState, MotionEvent};
pub use raster::{
    RasterParameters, RasterPathGenerator, ScanAxis, ScanLine, Segment, TraversalDirection,
};
pub use threshold::{FixedThreshold, OrderedDither, ThresholdMethod, ThresholdStrategy};
pub use toolpath::{Toolpath, ToolpathHeader, ToolpathStats};
pub use vector::{Polyline, TraceParameters, VectorTracer};
