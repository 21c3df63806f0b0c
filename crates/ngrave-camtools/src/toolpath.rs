//! Finalized toolpaths.

use crate::motion::MotionEvent;
use ngrave_core::{LengthUnit, Point};
use serde::{Deserialize, Serialize};

/// Job-level metadata carried alongside the motion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolpathHeader {
    /// Machine position of source coordinate (0, 0)
    pub origin: Point,
    /// Machine units per source unit
    pub scale: f64,
    /// Unit of machine coordinates
    pub units: LengthUnit,
    /// Feed rate for travel moves (units/min)
    pub travel_feed_rate: f64,
    /// Feed rate for engraving moves (units/min)
    pub engrave_feed_rate: f64,
    /// Power value sent when the laser turns on
    pub max_power: u32,
    /// Job extent in source units as (min, max)
    pub bounds: (Point, Point),
}

/// Path length summary in machine units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ToolpathStats {
    pub travel_length: f64,
    pub engrave_length: f64,
    pub travel_moves: usize,
    pub engrave_moves: usize,
    pub power_changes: usize,
    pub feed_changes: usize,
}

/// Ordered motion events plus header metadata. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Toolpath {
    header: ToolpathHeader,
    events: Vec<MotionEvent>,
}

impl Toolpath {
    pub fn new(header: ToolpathHeader, events: Vec<MotionEvent>) -> Self {
        Self { header, events }
    }

    pub fn header(&self) -> &ToolpathHeader {
        &self.header
    }

    pub fn events(&self) -> &[MotionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Converts a source point to machine coordinates.
    pub fn to_machine(&self, point: Point) -> Point {
        point.scaled(self.header.scale).offset(self.header.origin)
    }

    /// Job extent in machine coordinates as (min, max).
    pub fn machine_bounds(&self) -> (Point, Point) {
        let (min, max) = self.header.bounds;
        (self.to_machine(min), self.to_machine(max))
    }

    /// Walks the events from the origin and sums move lengths.
    pub fn stats(&self) -> ToolpathStats {
        let mut stats = ToolpathStats::default();
        let mut position = Point::origin();
        for event in &self.events {
            match event {
                MotionEvent::MoveTravel(to) => {
                    stats.travel_length += position.distance_to(to) * self.header.scale;
                    stats.travel_moves += 1;
                    position = *to;
                }
                MotionEvent::MoveEngrave(to) => {
                    stats.engrave_length += position.distance_to(to) * self.header.scale;
                    stats.engrave_moves += 1;
                    position = *to;
                }
                MotionEvent::SetPower(_) => stats.power_changes += 1,
                MotionEvent::SetFeed(_) => stats.feed_changes += 1,
            }
        }
        stats
    }

    /// Estimated run time in seconds from path lengths and feed rates.
    pub fn estimate_time(&self) -> f64 {
        let stats = self.stats();
        let engrave = stats.engrave_length / self.header.engrave_feed_rate * 60.0;
        let travel = stats.travel_length / self.header.travel_feed_rate * 60.0;
        engrave + travel
    }
}
