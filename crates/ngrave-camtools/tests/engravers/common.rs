use ngrave_camtools::{
    Bitmap, EmitterSettings, RasterParameters, RasterPathGenerator, Toolpath, ToolpathEmitter,
    ToolpathHeader,
};
use ngrave_core::{LengthUnit, Point};

/// Builds a bitmap from rows of 0/1.
pub fn bitmap(rows: &[&[u8]], scale: f64) -> Bitmap {
    let rows: Vec<Vec<bool>> = rows
        .iter()
        .map(|r| r.iter().map(|&c| c != 0).collect())
        .collect();
    Bitmap::from_rows(&rows, scale).unwrap()
}

/// Raster toolpath with the origin at zero.
pub fn raster_toolpath(bitmap: &Bitmap, params: RasterParameters) -> Toolpath {
    let events = RasterPathGenerator::new(params).generate(bitmap);
    Toolpath::new(
        ToolpathHeader {
            origin: Point::origin(),
            scale: bitmap.scale(),
            units: LengthUnit::Millimeters,
            travel_feed_rate: params.travel_feed_rate,
            engrave_feed_rate: params.engrave_feed_rate,
            max_power: 1000,
            bounds: (
                Point::origin(),
                Point::new(bitmap.width() as f64, bitmap.height() as f64),
            ),
        },
        events,
    )
}

pub fn render(toolpath: &Toolpath) -> String {
    ToolpathEmitter::new(EmitterSettings::default()).render(toolpath)
}

/// Lines between "; Begin engraving" and the following blank line.
pub fn body(gcode: &str) -> Vec<&str> {
    gcode
        .lines()
        .skip_while(|l| *l != "; Begin engraving")
        .skip(1)
        .take_while(|l| !l.is_empty())
        .collect()
}
