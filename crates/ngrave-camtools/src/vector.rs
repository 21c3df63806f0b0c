//! Vector outline tracing
//!
//! Converts polylines straight into motion events, bypassing rasterization.
//! Polylines are traced in input order; each starts with a travel move to
//! its first vertex and engraves through the remaining vertices.

use crate::error::{EngraveError, EngraveResult};
use crate::motion::{MotionBuilder, MotionEvent};
use ngrave_core::Point;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An ordered list of vertices, optionally closed back to the first one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    #[serde(default)]
    pub closed: bool,
}

impl Polyline {
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertices in engraving order after the first one, including the
    /// closing vertex for closed polylines.
    fn engrave_targets(&self) -> impl Iterator<Item = Point> + '_ {
        let closing = match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 1 && first != last => {
                Some(*first)
            }
            _ => None,
        };
        self.points.iter().skip(1).copied().chain(closing)
    }
}

/// Smallest axis-aligned box containing every vertex, as (min, max).
pub fn bounds(polylines: &[Polyline]) -> Option<(Point, Point)> {
    let mut points = polylines.iter().flat_map(|p| p.points.iter());
    let first = *points.next()?;
    Some(points.fold((first, first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

/// Vector tracing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceParameters {
    /// Feed rate for travel moves (units/min)
    pub travel_feed_rate: f64,
    /// Feed rate for engraving moves (units/min)
    pub engrave_feed_rate: f64,
}

impl Default for TraceParameters {
    fn default() -> Self {
        Self {
            travel_feed_rate: 3000.0,
            engrave_feed_rate: 1000.0,
        }
    }
}

/// Traces polylines into motion events
#[derive(Debug, Clone)]
pub struct VectorTracer {
    params: TraceParameters,
}

impl VectorTracer {
    pub fn new(params: TraceParameters) -> Self {
        Self { params }
    }

    /// Traces `polylines` in order.
    ///
    /// Fails with [`EngraveError::EmptyPath`] if there are no polylines or
    /// one of them has no vertices. A single-vertex polyline only produces
    /// a travel move.
    pub fn trace(&self, polylines: &[Polyline]) -> EngraveResult<Vec<MotionEvent>> {
        if polylines.is_empty() {
            return Err(EngraveError::EmptyPath("no polylines".to_string()));
        }
        if let Some(index) = polylines.iter().position(Polyline::is_empty) {
            return Err(EngraveError::EmptyPath(format!(
                "polyline {} has no vertices",
                index
            )));
        }

        let mut builder =
            MotionBuilder::new(self.params.travel_feed_rate, self.params.engrave_feed_rate);
        for (index, polyline) in polylines.iter().enumerate() {
            if polyline.len() == 1 {
                warn!(index, "polyline has a single vertex, nothing to engrave");
            }
            builder.travel_to(polyline.points[0]);
            for target in polyline.engrave_targets() {
                builder.engrave_to(target);
            }
        }

        let events = builder.finish();
        debug!(
            polylines = polylines.len(),
            events = events.len(),
            "traced vector toolpath"
        );
        Ok(events)
    }
}
