//! # ngrave
//!
//! Image-to-toolpath engine for laser engravers. Grayscale images become
//! boustrophedon raster toolpaths, vector outlines are traced directly, and
//! both are written out as G-code for a configurable machine profile.
//!
//! ## Architecture
//!
//! ngrave is organized as a workspace with multiple crates:
//!
//! 1. **ngrave-core** - Geometry, length units, resolution parsing
//! 2. **ngrave-camtools** - Bitmap normalization, thresholding, raster and
//!    vector toolpath generation, G-code emission
//! 3. **ngrave-settings** - Configuration loading, validation and persistence
//! 4. **ngrave** - Re-exports, logging setup and the one-call pipeline

use anyhow::Context;
use std::path::Path;
use tracing::info;

pub use ngrave_core::{Length, LengthUnit, Point, Resolution, UnitError};

pub use ngrave_camtools::{
    Bitmap, BitmapEngraver, EmitterSettings, EngraveError, EngraveResult, EngravingParameters,
    FixedThreshold, ImageTransformations, LaserState, MachineProfile, MotionEvent, OrderedDither,
    ParameterError, Polyline, RasterParameters, RasterPathGenerator, ScanAxis, ThresholdMethod,
    ThresholdStrategy, Toolpath, ToolpathEmitter, ToolpathHeader, ToolpathStats,
    TraversalDirection, VectorEngraver, VectorTracer,
};

pub use ngrave_settings::{Config, LoggingSettings, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Human-readable output on stderr at `info`, overridable through `RUST_LOG`.
pub fn init_logging() -> anyhow::Result<()> {
    init_logging_with(&LoggingSettings::default())
}

/// Initialize logging from [`LoggingSettings`]
///
/// `RUST_LOG` directives take precedence over the configured level. Fails if
/// a global subscriber is already installed.
pub fn init_logging_with(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("invalid log level '{}'", settings.level))?;

    let json_layer = settings.json.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json()
    });
    let text_layer = (!settings.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

/// Engraves the image at `input` into a G-code file at `output` using the
/// engraving section of `config`.
pub fn engrave_image(input: &Path, output: &Path, config: &Config) -> anyhow::Result<ToolpathStats> {
    config.validate()?;
    let engraver = BitmapEngraver::from_file(input, config.engraving.clone())
        .with_context(|| format!("failed to prepare {}", input.display()))?;

    let toolpath = engraver.toolpath();
    ToolpathEmitter::new(config.engraving.emitter_settings())
        .write_to_file(&toolpath, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let stats = toolpath.stats();
    info!(
        input = %input.display(),
        output = %output.display(),
        engrave_moves = stats.engrave_moves,
        seconds = toolpath.estimate_time(),
        "engraving complete"
    );
    Ok(stats)
}

/// Traces `polylines` into a G-code file at `output`.
pub fn engrave_outline(
    polylines: Vec<Polyline>,
    output: &Path,
    config: &Config,
) -> anyhow::Result<ToolpathStats> {
    config.validate()?;
    let engraver = VectorEngraver::new(polylines, config.engraving.clone())?;
    let toolpath = engraver.toolpath()?;
    ToolpathEmitter::new(config.engraving.emitter_settings())
        .write_to_file(&toolpath, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let stats = toolpath.stats();
    info!(
        output = %output.display(),
        engrave_moves = stats.engrave_moves,
        "outline engraving complete"
    );
    Ok(stats)
}
