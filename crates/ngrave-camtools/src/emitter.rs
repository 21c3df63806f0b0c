//! Toolpath emission
//!
//! Renders a [`Toolpath`] as a line-oriented command stream: header comments,
//! the machine preamble, one line per motion event and the postamble.
//!
//! Coordinates are `origin + value * scale`, rounded to `decimal_places`
//! digits. The rounding step is the smallest distance the emitted program
//! can address: with the default of 3 places and millimetre units that is
//! 0.001 mm, and anything finer than half a step is lost.
//!
//! Rounding works on the exact binary value of the coordinate, with exact
//! ties going to the even digit: `0.0625` becomes `0.062`, while
//! `0.05 * 3.0` (stored as `0.15000000000000002`) becomes `0.2` at one place.

use crate::error::EngraveResult;
use crate::motion::{LaserState, MotionEvent};
use crate::toolpath::Toolpath;
use ngrave_core::Point;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Command vocabulary and templates for one machine family.
///
/// `laser_on` may use `{power}` and `feed` may use `{rate}`. `preamble` and
/// `postamble` may use `{units}`, `{laser_off}`, `{laser_on}`, `{focus_on}`,
/// `{travel}`, `{engrave}`, `{travel_feed}`, `{engrave_feed}`,
/// `{placement_feed}`, `{max_power}`, `{focus_power}`, `{origin_x}`,
/// `{origin_y}` and the job bounding box `{x0}`, `{y0}`, `{x1}`, `{y1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineProfile {
    /// Profile name, written to the header
    pub name: String,
    /// Command for moves with the laser off
    pub travel_command: String,
    /// Command for moves with the laser on
    pub engrave_command: String,
    /// Laser on template
    pub laser_on: String,
    /// Laser off command
    pub laser_off: String,
    /// Feed rate template
    pub feed: String,
    /// Prefix for comment lines
    pub comment_prefix: String,
    /// Power just high enough to see the spot without marking
    pub focus_power: u32,
    /// Feed rate for the placement trace in the preamble (units/min)
    pub placement_feed_rate: u32,
    /// Lines written before the first event
    pub preamble: String,
    /// Lines written after the last event
    pub postamble: String,
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self::grbl()
    }
}

impl MachineProfile {
    /// GRBL laser mode (`$32=1`): M3/M5 with an S power word.
    pub fn grbl() -> Self {
        Self {
            name: "grbl".to_string(),
            travel_command: "G0".to_string(),
            engrave_command: "G1".to_string(),
            laser_on: "M3 S{power}".to_string(),
            laser_off: "M5".to_string(),
            feed: "F{rate}".to_string(),
            comment_prefix: ";".to_string(),
            focus_power: 10,
            placement_feed_rate: 1000,
            preamble: "G90 ; Absolute positioning\n\
                       {units} ; Units\n\
                       G17 ; XY plane selection\n\
                       {laser_off} ; Laser off\n"
                .to_string(),
            postamble: "{laser_off} ; Laser off\n\
                        {travel} X{origin_x} Y{origin_y} ; Return to origin\n"
                .to_string(),
        }
    }

    /// LulzBot Mini with an engraving laser driven from the fan output.
    ///
    /// Homes and probes, traces the job bounding box at full power for
    /// placement, then dwells at focus power as a warning before starting.
    pub fn lulzbot_mini() -> Self {
        Self {
            name: "lulzbot_mini".to_string(),
            travel_command: "G1".to_string(),
            engrave_command: "G1".to_string(),
            laser_on: "M106 S{power}".to_string(),
            laser_off: "M107".to_string(),
            feed: "G1 F{rate}".to_string(),
            comment_prefix: ";".to_string(),
            focus_power: 90,
            placement_feed_rate: 500,
            preamble: "G26 ; Clear probe fail condition\n\
                       {units} ; Units\n\
                       G90 ; Absolute positioning\n\
                       M82 ; Extruder absolute mode\n\
                       {laser_off} ; Laser off\n\
                       M104 S0 ; Hotend off\n\
                       M140 S0 ; Bed heater off\n\
                       G92 E0 ; Reset extruder position\n\
                       G28 ; Home all axes\n\
                       G1 Z25 F{travel_feed} ; Set Z\n\
                       G28 X0 Y0 ; Home X and Y\n\
                       M204 S300 ; Probing acceleration\n\
                       G29 ; Probe bed\n\
                       M204 S2000 ; Standard acceleration\n\
                       G1 X5 Y15 Z25 F5000 ; Park\n\
                       G4 S1 ; Pause\n\
                       M400 ; Wait for moves\n\
                       {focus_on} ; Laser at focus power\n\
                       G4 S100 ; Dwell for focusing\n\
                       ; Bounding box for placement\n\
                       G1 X{x0} Y{y0} F{placement_feed} ; Lower left\n\
                       {laser_on}\n\
                       G1 X{x1} Y{y0} F{placement_feed}\n\
                       G1 X{x1} Y{y1} F{placement_feed}\n\
                       G1 X{x0} Y{y1} F{placement_feed}\n\
                       G1 X{x0} Y{y0} F{placement_feed}\n\
                       {laser_off}\n\
                       G4 S100 ; Dwell for positioning\n\
                       {focus_on}\n\
                       G1 X{x0} Y{y1} F{placement_feed} ; Warning movement\n\
                       G1 X{x0} Y{y0} F{placement_feed} ; Warning movement\n\
                       G4 S5 ; Warning dwell\n\
                       {laser_off}\n"
                .to_string(),
            postamble: "{laser_off} ; Laser off\n\
                        M104 S0 ; Hotend off\n\
                        M140 S0 ; Bed heater off\n\
                        M84 ; Steppers off\n\
                        G90 ; Absolute positioning\n"
                .to_string(),
        }
    }

    /// Looks up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "grbl" => Some(Self::grbl()),
            "lulzbot_mini" | "lulzbot-mini" | "lulzbot" => Some(Self::lulzbot_mini()),
            _ => None,
        }
    }

    fn laser_on_line(&self, power: u32) -> String {
        self.laser_on.replace("{power}", &power.to_string())
    }

    fn feed_line(&self, rate: f64) -> String {
        self.feed.replace("{rate}", &rate.to_string())
    }
}

/// Emission settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterSettings {
    pub profile: MachineProfile,
    /// Digits after the decimal point for coordinates
    pub decimal_places: usize,
    /// Write a UTC generation timestamp in the header
    pub include_timestamp: bool,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            profile: MachineProfile::default(),
            decimal_places: 3,
            include_timestamp: false,
        }
    }
}

/// Renders toolpaths into machine commands
#[derive(Debug, Clone, Default)]
pub struct ToolpathEmitter {
    settings: EmitterSettings,
}

impl ToolpathEmitter {
    pub fn new(settings: EmitterSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EmitterSettings {
        &self.settings
    }

    /// Rounds to the configured precision. Never yields "-0.000".
    pub fn format_coordinate(&self, value: f64) -> String {
        let formatted = format!("{:.*}", self.settings.decimal_places, value);
        match formatted.strip_prefix('-') {
            Some(magnitude) if magnitude.chars().all(|c| c == '0' || c == '.') => {
                magnitude.to_string()
            }
            _ => formatted,
        }
    }

    fn format_point(&self, point: Point) -> (String, String) {
        (
            self.format_coordinate(point.x),
            self.format_coordinate(point.y),
        )
    }

    fn render_template(&self, template: &str, toolpath: &Toolpath) -> String {
        let profile = &self.settings.profile;
        let header = toolpath.header();
        let (min, max) = toolpath.machine_bounds();
        let (x0, y0) = self.format_point(min);
        let (x1, y1) = self.format_point(max);
        let (origin_x, origin_y) = self.format_point(header.origin);

        let vars = [
            ("units", header.units.gcode().to_string()),
            ("laser_off", profile.laser_off.clone()),
            ("laser_on", profile.laser_on_line(header.max_power)),
            ("focus_on", profile.laser_on_line(profile.focus_power)),
            ("travel", profile.travel_command.clone()),
            ("engrave", profile.engrave_command.clone()),
            ("travel_feed", header.travel_feed_rate.to_string()),
            ("engrave_feed", header.engrave_feed_rate.to_string()),
            ("placement_feed", profile.placement_feed_rate.to_string()),
            ("max_power", header.max_power.to_string()),
            ("focus_power", profile.focus_power.to_string()),
            ("origin_x", origin_x),
            ("origin_y", origin_y),
            ("x0", x0),
            ("y0", y0),
            ("x1", x1),
            ("y1", y1),
        ];

        let mut rendered = vars.iter().fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        });
        if !rendered.is_empty() && !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        rendered
    }

    fn render_header(&self, toolpath: &Toolpath) -> String {
        let c = &self.settings.profile.comment_prefix;
        let header = toolpath.header();
        let unit = header.units.suffix();
        let (min, max) = toolpath.machine_bounds();

        let mut out = String::new();
        out.push_str(&format!("{} ngrave laser engraving\n", c));
        if self.settings.include_timestamp {
            out.push_str(&format!(
                "{} Generated: {}\n",
                c,
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        out.push_str(&format!("{} Profile: {}\n", c, self.settings.profile.name));
        out.push_str(&format!(
            "{} Job size: {:.3}{} x {:.3}{}\n",
            c,
            max.x - min.x,
            unit,
            max.y - min.y,
            unit
        ));
        out.push_str(&format!("{} Scale: {} {}/unit\n", c, header.scale, unit));
        out.push_str(&format!(
            "{} Feed rates: travel {}, engrave {} {}/min\n",
            c, header.travel_feed_rate, header.engrave_feed_rate, unit
        ));
        out.push_str(&format!("{} Max power: S{}\n", c, header.max_power));
        out.push_str(&format!(
            "{} Estimated time: {:.1} minutes\n",
            c,
            toolpath.estimate_time() / 60.0
        ));
        out
    }

    /// Renders the complete program.
    pub fn render(&self, toolpath: &Toolpath) -> String {
        let profile = &self.settings.profile;
        let c = &profile.comment_prefix;

        let mut out = self.render_header(toolpath);
        out.push('\n');
        out.push_str(&self.render_template(&profile.preamble, toolpath));
        out.push('\n');
        out.push_str(&format!("{} Begin engraving\n", c));

        // The preamble leaves the laser off
        let mut laser = LaserState::Off;
        let mut feed: Option<f64> = None;
        for event in toolpath.events() {
            match *event {
                MotionEvent::SetPower(state) => {
                    if state != laser {
                        match state {
                            LaserState::On => {
                                out.push_str(&profile.laser_on_line(toolpath.header().max_power))
                            }
                            LaserState::Off => out.push_str(&profile.laser_off),
                        }
                        out.push('\n');
                        laser = state;
                    }
                }
                MotionEvent::SetFeed(rate) => {
                    if feed != Some(rate) {
                        out.push_str(&profile.feed_line(rate));
                        out.push('\n');
                        feed = Some(rate);
                    }
                }
                MotionEvent::MoveTravel(to) => {
                    if laser == LaserState::On {
                        warn!(%to, "travel move with the laser on");
                    }
                    let (x, y) = self.format_point(toolpath.to_machine(to));
                    out.push_str(&format!("{} X{} Y{}\n", profile.travel_command, x, y));
                }
                MotionEvent::MoveEngrave(to) => {
                    if laser == LaserState::Off {
                        warn!(%to, "engrave move with the laser off");
                    }
                    let (x, y) = self.format_point(toolpath.to_machine(to));
                    out.push_str(&format!("{} X{} Y{}\n", profile.engrave_command, x, y));
                }
            }
        }
        if laser == LaserState::On {
            out.push_str(&profile.laser_off);
            out.push('\n');
        }

        out.push('\n');
        out.push_str(&format!("{} End of engraving\n", c));
        out.push_str(&self.render_template(&profile.postamble, toolpath));
        out
    }

    /// Writes the program to `writer` and flushes it.
    pub fn write_to<W: Write>(&self, toolpath: &Toolpath, mut writer: W) -> EngraveResult<()> {
        writer.write_all(self.render(toolpath).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Writes the program to a file. The file is closed on every path; a
    /// failed write leaves a partial file the caller must discard.
    pub fn write_to_file<P: AsRef<Path>>(&self, toolpath: &Toolpath, path: P) -> EngraveResult<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(toolpath, &mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        info!(path = %path.display(), events = toolpath.len(), "wrote toolpath");
        Ok(())
    }
}
