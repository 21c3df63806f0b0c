//! Raster path generation
//!
//! Walks a [`Bitmap`] line by line in alternating (boustrophedon) direction,
//! merges runs of occupied cells into segments and emits one engraving move
//! per segment. Lines are rows for horizontal scanning, columns for vertical
//! scanning. Images are processed top to bottom in grid order; the emitted
//! Y coordinate of row `y` is `y * scale`.

use crate::bitmap::Bitmap;
use crate::motion::{MotionBuilder, MotionEvent};
use ngrave_core::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scan axis for laser engraving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanAxis {
    /// Rows, top to bottom
    #[default]
    Horizontal,
    /// Columns, left to right
    Vertical,
}

/// Traversal direction along a scan line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalDirection {
    /// Increasing cell index (left to right, or top to bottom)
    #[default]
    Forward,
    /// Decreasing cell index
    Reverse,
}

impl TraversalDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Raster generation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterParameters {
    /// Scan axis
    pub axis: ScanAxis,
    /// Direction of the first scan line
    pub initial_direction: TraversalDirection,
    /// Feed rate for travel moves (units/min)
    pub travel_feed_rate: f64,
    /// Feed rate for engraving moves (units/min)
    pub engrave_feed_rate: f64,
}

impl Default for RasterParameters {
    fn default() -> Self {
        Self {
            axis: ScanAxis::Horizontal,
            initial_direction: TraversalDirection::Forward,
            travel_feed_rate: 3000.0,
            engrave_feed_rate: 1000.0,
        }
    }
}

/// A maximal run of occupied cells along a scan line.
///
/// `start` and `end` are cell edges in traversal order: a run over cells
/// `a..=b` is `[a, b + 1]` when scanned forward and `[b + 1, a]` in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: u32,
    pub end: u32,
}

impl Segment {
    /// Number of cells covered.
    pub fn len(&self) -> u32 {
        self.start.abs_diff(self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Start and end in physical units.
    pub fn physical_span(&self, scale: f64) -> (f64, f64) {
        (self.start as f64 * scale, self.end as f64 * scale)
    }
}

/// One row or column of the bitmap with its traversal direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLine {
    /// Row index (horizontal) or column index (vertical)
    pub index: u32,
    pub direction: TraversalDirection,
    cells: Vec<bool>,
}

impl ScanLine {
    pub fn new(index: u32, direction: TraversalDirection, cells: Vec<bool>) -> Self {
        Self {
            index,
            direction,
            cells,
        }
    }

    /// Cells in grid order, independent of direction.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Maximal occupied runs, ordered by the line's direction. A single
    /// unoccupied cell always breaks a run.
    pub fn segments(&self) -> Vec<Segment> {
        let mut runs = Vec::new();
        let mut run_start: Option<u32> = None;

        for (i, &occupied) in self.cells.iter().enumerate() {
            let i = i as u32;
            match (occupied, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    runs.push((start, i));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push((start, self.cells.len() as u32));
        }

        match self.direction {
            TraversalDirection::Forward => runs
                .into_iter()
                .map(|(start, end)| Segment { start, end })
                .collect(),
            TraversalDirection::Reverse => runs
                .into_iter()
                .rev()
                .map(|(start, end)| Segment {
                    start: end,
                    end: start,
                })
                .collect(),
        }
    }
}

/// Boustrophedon raster toolpath generator
#[derive(Debug, Clone)]
pub struct RasterPathGenerator {
    params: RasterParameters,
}

impl RasterPathGenerator {
    pub fn new(params: RasterParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RasterParameters {
        &self.params
    }

    /// Splits the bitmap into scan lines. Direction flips on every line,
    /// empty or not.
    pub fn scanlines(&self, bitmap: &Bitmap) -> Vec<ScanLine> {
        let count = match self.params.axis {
            ScanAxis::Horizontal => bitmap.height(),
            ScanAxis::Vertical => bitmap.width(),
        };

        let mut direction = self.params.initial_direction;
        let mut lines = Vec::with_capacity(count as usize);
        for index in 0..count {
            let cells = match self.params.axis {
                ScanAxis::Horizontal => bitmap.row(index).to_vec(),
                ScanAxis::Vertical => bitmap.column(index),
            };
            lines.push(ScanLine::new(index, direction, cells));
            direction = direction.reversed();
        }
        lines
    }

    /// Generates the motion events for `bitmap`.
    pub fn generate(&self, bitmap: &Bitmap) -> Vec<MotionEvent> {
        self.generate_with_progress(bitmap, |_| {})
    }

    /// Generates the motion events, reporting progress in 0.0..=1.0.
    pub fn generate_with_progress<F>(
        &self,
        bitmap: &Bitmap,
        mut progress_callback: F,
    ) -> Vec<MotionEvent>
    where
        F: FnMut(f32),
    {
        let lines = self.scanlines(bitmap);
        let total = lines.len();
        let mut builder =
            MotionBuilder::new(self.params.travel_feed_rate, self.params.engrave_feed_rate);
        let mut segment_count = 0usize;

        progress_callback(0.0);
        for (i, line) in lines.iter().enumerate() {
            for segment in line.segments() {
                builder.travel_to(self.point_on_line(line.index, segment.start));
                builder.engrave_to(self.point_on_line(line.index, segment.end));
                segment_count += 1;
            }

            if i % 10 == 0 || i + 1 == total {
                progress_callback((i + 1) as f32 / total as f32);
            }
        }

        let events = builder.finish();
        debug!(
            lines = total,
            segments = segment_count,
            events = events.len(),
            "generated raster toolpath"
        );
        events
    }

    /// Maps (line index, position along the line) to grid coordinates.
    fn point_on_line(&self, index: u32, along: u32) -> Point {
        match self.params.axis {
            ScanAxis::Horizontal => Point::new(along as f64, index as f64),
            ScanAxis::Vertical => Point::new(index as f64, along as f64),
        }
    }
}
