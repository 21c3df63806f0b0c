//! Laser Image Engraving Tool
//!
//! Ties the pipeline together: image → [`Bitmap`] → raster toolpath → G-code,
//! or polylines → vector toolpath → G-code. All configuration arrives through
//! [`EngravingParameters`]; each stage gets its own slice of it.

use crate::bitmap::{Bitmap, ImageTransformations};
use crate::emitter::{EmitterSettings, MachineProfile, ToolpathEmitter};
use crate::error::{EngraveResult, ParameterError, ParameterResult};
use crate::raster::{RasterParameters, RasterPathGenerator, ScanAxis, TraversalDirection};
use crate::threshold::ThresholdMethod;
use crate::toolpath::{Toolpath, ToolpathHeader};
use crate::vector::{self, Polyline, TraceParameters, VectorTracer};
use image::{DynamicImage, GrayImage};
use ngrave_core::{LengthUnit, Point, Resolution};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Upper bound for coordinate precision.
pub const MAX_DECIMAL_PLACES: usize = 6;

/// Laser engraving parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngravingParameters {
    /// Raster resolution; determines the size of one source pixel
    pub resolution: Resolution,
    /// Machine units per outline unit for vector input
    pub outline_scale: f64,
    /// Unit of emitted coordinates
    pub units: LengthUnit,
    /// Thresholding method
    pub threshold: ThresholdMethod,
    /// Image transformations applied before thresholding
    pub transformations: ImageTransformations,
    /// Scan axis
    pub scan_axis: ScanAxis,
    /// Direction of the first scan line
    pub initial_direction: TraversalDirection,
    /// Travel feed rate for non-engraving moves (units/min)
    pub travel_feed_rate: f64,
    /// Feed rate for engraving moves (units/min)
    pub engrave_feed_rate: f64,
    /// Power value sent with the laser-on command
    pub max_power: u32,
    /// X offset from machine origin
    pub offset_x: f64,
    /// Y offset from machine origin
    pub offset_y: f64,
    /// Digits after the decimal point for coordinates
    pub decimal_places: usize,
    /// Write a generation timestamp into the header
    pub include_timestamp: bool,
    /// Target machine
    pub machine: MachineProfile,
}

impl Default for EngravingParameters {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            outline_scale: 1.0,
            units: LengthUnit::Millimeters,
            threshold: ThresholdMethod::default(),
            transformations: ImageTransformations::default(),
            scan_axis: ScanAxis::Horizontal,
            initial_direction: TraversalDirection::Forward,
            travel_feed_rate: 3000.0,
            engrave_feed_rate: 1000.0,
            max_power: 1000,
            offset_x: 0.0,
            offset_y: 0.0,
            decimal_places: 3,
            include_timestamp: false,
            machine: MachineProfile::default(),
        }
    }
}

impl EngravingParameters {
    /// Physical size of one source pixel in `units`.
    pub fn pixel_scale(&self) -> f64 {
        self.resolution.units_per_pixel(self.units)
    }

    /// Validates feed rates, power and precision. Scales are checked by the
    /// stage that uses them.
    pub fn validate(&self) -> ParameterResult<()> {
        ParameterError::require_positive("travel_feed_rate", self.travel_feed_rate)?;
        ParameterError::require_positive("engrave_feed_rate", self.engrave_feed_rate)?;
        if self.max_power == 0 {
            return Err(ParameterError::InvalidValue {
                name: "max_power".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ParameterError::OutOfRange {
                name: "decimal_places".to_string(),
                value: self.decimal_places as f64,
                min: 0.0,
                max: MAX_DECIMAL_PLACES as f64,
            });
        }
        if !self.offset_x.is_finite() || !self.offset_y.is_finite() {
            return Err(ParameterError::InvalidValue {
                name: "offset".to_string(),
                reason: "must be finite".to_string(),
            });
        }
        Ok(())
    }

    pub fn raster_parameters(&self) -> RasterParameters {
        RasterParameters {
            axis: self.scan_axis,
            initial_direction: self.initial_direction,
            travel_feed_rate: self.travel_feed_rate,
            engrave_feed_rate: self.engrave_feed_rate,
        }
    }

    pub fn trace_parameters(&self) -> TraceParameters {
        TraceParameters {
            travel_feed_rate: self.travel_feed_rate,
            engrave_feed_rate: self.engrave_feed_rate,
        }
    }

    pub fn emitter_settings(&self) -> EmitterSettings {
        EmitterSettings {
            profile: self.machine.clone(),
            decimal_places: self.decimal_places,
            include_timestamp: self.include_timestamp,
        }
    }

    fn toolpath_header(&self, scale: f64, bounds: (Point, Point)) -> ToolpathHeader {
        ToolpathHeader {
            origin: Point::new(self.offset_x, self.offset_y),
            scale,
            units: self.units,
            travel_feed_rate: self.travel_feed_rate,
            engrave_feed_rate: self.engrave_feed_rate,
            max_power: self.max_power,
            bounds,
        }
    }
}

/// Laser engraving tool for bitmap images
#[derive(Debug, Clone)]
pub struct BitmapEngraver {
    bitmap: Bitmap,
    params: EngravingParameters,
}

impl BitmapEngraver {
    /// Create a new laser engraver from an image file
    pub fn from_file<P: AsRef<Path>>(path: P, params: EngravingParameters) -> EngraveResult<Self> {
        let img = image::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "loaded image");
        Self::from_image(img, params)
    }

    /// Create a new laser engraver from a DynamicImage
    pub fn from_image(img: DynamicImage, params: EngravingParameters) -> EngraveResult<Self> {
        Self::from_gray(img.to_luma8(), params)
    }

    /// Create a new laser engraver from a grayscale image
    pub fn from_gray(mut gray: GrayImage, params: EngravingParameters) -> EngraveResult<Self> {
        params.validate()?;
        params.transformations.apply(&mut gray);

        let strategy = params.threshold.strategy();
        let mut bitmap = Bitmap::normalize(&gray, params.pixel_scale(), strategy.as_ref())?;
        if params.transformations.crop_to_content {
            bitmap = bitmap.crop_to_content()?;
        }

        info!(
            width = bitmap.width(),
            height = bitmap.height(),
            threshold = %params.threshold,
            "prepared bitmap"
        );
        Ok(Self { bitmap, params })
    }

    /// Create an engraver from an already normalized bitmap. The bitmap's own
    /// scale is used instead of the configured resolution.
    pub fn from_bitmap(bitmap: Bitmap, params: EngravingParameters) -> EngraveResult<Self> {
        params.validate()?;
        Ok(Self { bitmap, params })
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn params(&self) -> &EngravingParameters {
        &self.params
    }

    /// Get the output dimensions in machine units
    pub fn output_size(&self) -> (f64, f64) {
        self.bitmap.physical_size()
    }

    /// Build the toolpath
    pub fn toolpath(&self) -> Toolpath {
        self.toolpath_with_progress(|_| {})
    }

    /// Build the toolpath, reporting progress in 0.0..=1.0
    pub fn toolpath_with_progress<F>(&self, progress_callback: F) -> Toolpath
    where
        F: FnMut(f32),
    {
        let generator = RasterPathGenerator::new(self.params.raster_parameters());
        let events = generator.generate_with_progress(&self.bitmap, progress_callback);
        let bounds = (
            Point::origin(),
            Point::new(self.bitmap.width() as f64, self.bitmap.height() as f64),
        );
        Toolpath::new(
            self.params.toolpath_header(self.bitmap.scale(), bounds),
            events,
        )
    }

    /// Estimate engraving time in seconds
    pub fn estimate_time(&self) -> f64 {
        self.toolpath().estimate_time()
    }

    /// Generate G-code for laser engraving
    pub fn generate_gcode(&self) -> String {
        self.generate_gcode_with_progress(|_| {})
    }

    /// Generate G-code for laser engraving with progress callback
    pub fn generate_gcode_with_progress<F>(&self, progress_callback: F) -> String
    where
        F: FnMut(f32),
    {
        let toolpath = self.toolpath_with_progress(progress_callback);
        ToolpathEmitter::new(self.params.emitter_settings()).render(&toolpath)
    }

    /// Write G-code to a file
    pub fn write_gcode<P: AsRef<Path>>(&self, path: P) -> EngraveResult<()> {
        let toolpath = self.toolpath();
        ToolpathEmitter::new(self.params.emitter_settings()).write_to_file(&toolpath, path)
    }
}

/// Laser engraving tool for vector outlines
#[derive(Debug, Clone)]
pub struct VectorEngraver {
    polylines: Vec<Polyline>,
    params: EngravingParameters,
}

impl VectorEngraver {
    /// Create a new vector engraver. Fails if the outline is empty.
    pub fn new(polylines: Vec<Polyline>, params: EngravingParameters) -> EngraveResult<Self> {
        params.validate()?;
        crate::bitmap::validate_scale(params.outline_scale)?;
        let engraver = Self { polylines, params };
        // Reject empty input up front rather than at generation time
        engraver.tracer().trace(&engraver.polylines)?;
        Ok(engraver)
    }

    fn tracer(&self) -> VectorTracer {
        VectorTracer::new(self.params.trace_parameters())
    }

    pub fn polylines(&self) -> &[Polyline] {
        &self.polylines
    }

    /// Build the toolpath
    pub fn toolpath(&self) -> EngraveResult<Toolpath> {
        let events = self.tracer().trace(&self.polylines)?;
        let bounds = vector::bounds(&self.polylines).unwrap_or_default();
        Ok(Toolpath::new(
            self.params
                .toolpath_header(self.params.outline_scale, bounds),
            events,
        ))
    }

    /// Generate G-code for the outline
    pub fn generate_gcode(&self) -> EngraveResult<String> {
        let toolpath = self.toolpath()?;
        Ok(ToolpathEmitter::new(self.params.emitter_settings()).render(&toolpath))
    }

    /// Write G-code to a file
    pub fn write_gcode<P: AsRef<Path>>(&self, path: P) -> EngraveResult<()> {
        let toolpath = self.toolpath()?;
        ToolpathEmitter::new(self.params.emitter_settings()).write_to_file(&toolpath, path)
    }
}
