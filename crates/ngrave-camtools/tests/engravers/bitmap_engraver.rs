use crate::common::body;
use image::{GrayImage, Luma};
use ngrave_camtools::{
    BitmapEngraver, EngraveError, EngravingParameters, ImageTransformations, MachineProfile,
    ThresholdMethod,
};
use ngrave_core::{Length, LengthUnit, Resolution};
use tempfile::tempdir;

fn params() -> EngravingParameters {
    EngravingParameters {
        resolution: Resolution::Pitch(Length::mm(1.0)),
        ..Default::default()
    }
}

fn image(rows: &[&[u8]]) -> GrayImage {
    let height = rows.len() as u32;
    let width = rows[0].len() as u32;
    GrayImage::from_fn(width, height, |x, y| Luma([rows[y as usize][x as usize]]))
}

#[test]
fn test_threshold_boundary() {
    let engraver = BitmapEngraver::from_gray(image(&[&[127, 128, 255, 0]]), params()).unwrap();
    let bitmap = engraver.bitmap();
    assert!(!bitmap.get(0, 0));
    assert!(bitmap.get(1, 0));
    assert!(bitmap.get(2, 0));
    assert!(!bitmap.get(3, 0));

    let lines = body(&engraver.generate_gcode()).join("\n");
    assert!(lines.contains("G0 X1.000 Y0.000"));
    assert!(lines.contains("G1 X3.000 Y0.000"));
}

#[test]
fn test_invert_and_mirror() {
    let p = EngravingParameters {
        transformations: ImageTransformations {
            invert: true,
            mirror_x: true,
            ..Default::default()
        },
        ..params()
    };
    // Dark pixel at x = 0 becomes an engraved cell at x = 2
    let engraver = BitmapEngraver::from_gray(image(&[&[0, 255, 255]]), p).unwrap();
    assert_eq!(engraver.bitmap().occupied_count(), 1);
    assert!(engraver.bitmap().get(2, 0));
}

#[test]
fn test_inch_units() {
    let p = EngravingParameters {
        resolution: Resolution::DotsPerInch(100.0),
        units: LengthUnit::Inches,
        ..Default::default()
    };
    let engraver = BitmapEngraver::from_gray(image(&[&[0, 255]]), p).unwrap();
    let gcode = engraver.generate_gcode();
    assert!(gcode.contains("G20 ; Units"));
    assert!(body(&gcode).contains(&"G1 X0.020 Y0.000"));
}

#[test]
fn test_dithered_gray_field() {
    let p = EngravingParameters {
        threshold: ThresholdMethod::Bayer4x4,
        ..params()
    };
    let engraver = BitmapEngraver::from_gray(GrayImage::from_pixel(8, 8, Luma([128])), p).unwrap();
    // Mid gray lights roughly half of the cells
    assert_eq!(engraver.bitmap().occupied_count(), 32);
}

#[test]
fn test_write_png_roundtrip_to_gcode_file() {
    let dir = tempdir().unwrap();
    let png = dir.path().join("input.png");
    let out = dir.path().join("out.gcode");
    image(&[&[255, 255, 0], &[0, 255, 255]]).save(&png).unwrap();

    let engraver = BitmapEngraver::from_file(&png, params()).unwrap();
    assert_eq!(engraver.output_size(), (3.0, 2.0));
    engraver.write_gcode(&out).unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written, engraver.generate_gcode());
    assert_eq!(
        body(&written)
            .iter()
            .filter(|l| l.starts_with("G1 "))
            .count(),
        2
    );
    assert!(engraver.estimate_time() > 0.0);
}

#[test]
fn test_lulzbot_profile_placement_trace() {
    let p = EngravingParameters {
        machine: MachineProfile::lulzbot_mini(),
        max_power: 255,
        offset_x: 20.0,
        offset_y: 20.0,
        ..params()
    };
    let engraver = BitmapEngraver::from_gray(image(&[&[255, 255], &[255, 255]]), p).unwrap();
    let gcode = engraver.generate_gcode();
    assert!(gcode.contains("M106 S255"));
    assert!(gcode.contains("G1 X22.000 Y20.000 F500"));
    assert!(gcode.contains("G1 X22.000 Y22.000 F500"));
    assert!(!gcode.contains('{'));
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let err = BitmapEngraver::from_file(dir.path().join("missing.png"), params()).unwrap_err();
    assert!(matches!(
        err,
        EngraveError::ImageLoad(_) | EngraveError::IoFailure(_)
    ));
}

#[test]
fn test_empty_image() {
    let err = BitmapEngraver::from_gray(GrayImage::new(0, 3), params()).unwrap_err();
    assert!(matches!(err, EngraveError::EmptyImage { .. }));
}
