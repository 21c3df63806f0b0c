//! Abstract motion events.
//!
//! A toolpath is an ordered list of [`MotionEvent`]s. Coordinates are in
//! source units (grid cell edges or outline units); the emitter applies the
//! physical scale.

use ngrave_core::Point;
use serde::{Deserialize, Serialize};

/// Laser power state. Output is binary: on means the job's maximum power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaserState {
    Off,
    On,
}

/// One abstract toolpath instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionEvent {
    /// Non-engraving move with the laser off.
    MoveTravel(Point),
    /// Engraving move with the laser on.
    MoveEngrave(Point),
    /// Laser state change.
    SetPower(LaserState),
    /// Feed rate change in units per minute.
    SetFeed(f64),
}

impl MotionEvent {
    /// Destination of a move event.
    pub fn target(&self) -> Option<Point> {
        match self {
            Self::MoveTravel(p) | Self::MoveEngrave(p) => Some(*p),
            Self::SetPower(_) | Self::SetFeed(_) => None,
        }
    }

    pub fn is_engrave(&self) -> bool {
        matches!(self, Self::MoveEngrave(_))
    }

    pub fn is_travel(&self) -> bool {
        matches!(self, Self::MoveTravel(_))
    }
}

/// Accumulates events while tracking laser and feed state so that state
/// changes are only recorded when the value differs.
#[derive(Debug)]
pub(crate) struct MotionBuilder {
    events: Vec<MotionEvent>,
    laser: LaserState,
    feed: Option<f64>,
    travel_feed_rate: f64,
    engrave_feed_rate: f64,
}

impl MotionBuilder {
    pub(crate) fn new(travel_feed_rate: f64, engrave_feed_rate: f64) -> Self {
        Self {
            events: Vec::new(),
            laser: LaserState::Off,
            feed: None,
            travel_feed_rate,
            engrave_feed_rate,
        }
    }

    fn set_power(&mut self, state: LaserState) {
        if self.laser != state {
            self.events.push(MotionEvent::SetPower(state));
            self.laser = state;
        }
    }

    fn set_feed(&mut self, rate: f64) {
        if self.feed != Some(rate) {
            self.events.push(MotionEvent::SetFeed(rate));
            self.feed = Some(rate);
        }
    }

    /// Laser off, travel feed, then move.
    pub(crate) fn travel_to(&mut self, to: Point) {
        self.set_power(LaserState::Off);
        self.set_feed(self.travel_feed_rate);
        self.events.push(MotionEvent::MoveTravel(to));
    }

    /// Laser on, engrave feed, then move.
    pub(crate) fn engrave_to(&mut self, to: Point) {
        self.set_power(LaserState::On);
        self.set_feed(self.engrave_feed_rate);
        self.events.push(MotionEvent::MoveEngrave(to));
    }

    /// Turns the laser off if it was left on and returns the events.
    pub(crate) fn finish(mut self) -> Vec<MotionEvent> {
        self.set_power(LaserState::Off);
        self.events
    }
}
