use crate::common::{bitmap, body, raster_toolpath, render};
use ngrave_camtools::{RasterParameters, RasterPathGenerator, ScanAxis};

#[test]
fn test_single_row_run() {
    let bm = bitmap(&[&[1, 1, 0]], 1.0);
    let gcode = render(&raster_toolpath(&bm, RasterParameters::default()));

    assert_eq!(
        body(&gcode),
        vec![
            "F3000",
            "G0 X0.000 Y0.000",
            "M3 S1000",
            "F1000",
            "G1 X2.000 Y0.000",
            "M5",
        ]
    );
}

#[test]
fn test_engrave_moves_match_runs() {
    // Checkerboard-ish pattern with runs of varying length
    let rows: Vec<Vec<u8>> = (0..12u32)
        .map(|y| (0..17u32).map(|x| ((x * 7 + y * 3) % 5 < 2) as u8).collect())
        .collect();
    let rows: Vec<&[u8]> = rows.iter().map(|r| r.as_slice()).collect();
    let bm = bitmap(&rows, 0.1);

    for axis in [ScanAxis::Horizontal, ScanAxis::Vertical] {
        let params = RasterParameters {
            axis,
            ..Default::default()
        };
        let runs: usize = RasterPathGenerator::new(params)
            .scanlines(&bm)
            .iter()
            .map(|line| line.segments().len())
            .sum();

        let gcode = render(&raster_toolpath(&bm, params));
        let engraves = body(&gcode)
            .iter()
            .filter(|l| l.starts_with("G1 "))
            .count();
        assert_eq!(engraves, runs, "axis {:?}", axis);
        assert!(runs > 0);
    }
}

#[test]
fn test_output_is_deterministic() {
    let bm = bitmap(&[&[0, 1, 1, 0, 1], &[1, 0, 1, 1, 1], &[1, 1, 1, 1, 1]], 0.25);
    let first = render(&raster_toolpath(&bm, RasterParameters::default()));
    let second = render(&raster_toolpath(&bm, RasterParameters::default()));
    assert_eq!(first, second);
}

#[test]
fn test_direction_alternates() {
    let bm = bitmap(&[&[1, 1, 1, 1], &[1, 1, 1, 1], &[1, 1, 1, 1]], 1.0);
    let gcode = render(&raster_toolpath(&bm, RasterParameters::default()));
    let engraves: Vec<_> = body(&gcode)
        .into_iter()
        .filter(|l| l.starts_with("G1 "))
        .collect();
    assert_eq!(
        engraves,
        vec!["G1 X4.000 Y0.000", "G1 X0.000 Y1.000", "G1 X4.000 Y2.000"]
    );
}

#[test]
fn test_empty_lines_still_flip_direction() {
    let bm = bitmap(&[&[1, 1], &[0, 0], &[1, 1]], 1.0);
    let gcode = render(&raster_toolpath(&bm, RasterParameters::default()));
    let lines = body(&gcode);
    // Row 2 is scanned forward again because row 1 counted as a reverse pass
    assert!(lines.contains(&"G0 X0.000 Y2.000"));
    assert!(lines.contains(&"G1 X2.000 Y2.000"));
}

#[test]
fn test_blank_bitmap_has_empty_body() {
    let bm = bitmap(&[&[0, 0, 0], &[0, 0, 0]], 1.0);
    let gcode = render(&raster_toolpath(&bm, RasterParameters::default()));
    assert!(body(&gcode).is_empty());
    assert!(gcode.contains("; End of engraving"));
}

#[test]
fn test_coordinates_are_scaled() {
    let bm = bitmap(&[&[0, 0, 0, 1]], 0.5);
    let gcode = render(&raster_toolpath(&bm, RasterParameters::default()));
    let lines = body(&gcode);
    assert!(lines.contains(&"G0 X1.500 Y0.000"));
    assert!(lines.contains(&"G1 X2.000 Y0.000"));
}

#[test]
fn test_laser_never_on_during_travel() {
    let bm = bitmap(&[&[1, 0, 1, 0, 1], &[0, 1, 0, 1, 0]], 1.0);
    let gcode = render(&raster_toolpath(&bm, RasterParameters::default()));

    let mut on = false;
    for line in body(&gcode) {
        match line {
            l if l.starts_with("M3") => on = true,
            "M5" => on = false,
            l if l.starts_with("G0 ") => assert!(!on, "travel with laser on: {}", l),
            l if l.starts_with("G1 ") => assert!(on, "engrave with laser off: {}", l),
            _ => {}
        }
    }
    assert!(!on);
}
