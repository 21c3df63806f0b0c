use crate::common::body;
use ngrave_camtools::{EngraveError, EngravingParameters, Polyline, VectorEngraver};
use ngrave_core::Point;

fn triangle() -> Polyline {
    Polyline::closed(vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(5.0, 8.0),
    ])
}

#[test]
fn test_closed_triangle_gcode() {
    let params = EngravingParameters {
        outline_scale: 2.0,
        offset_x: 10.0,
        offset_y: 10.0,
        ..Default::default()
    };
    let engraver = VectorEngraver::new(vec![triangle()], params).unwrap();
    let gcode = engraver.generate_gcode().unwrap();

    assert_eq!(
        body(&gcode),
        vec![
            "F3000",
            "G0 X10.000 Y10.000",
            "M3 S1000",
            "F1000",
            "G1 X30.000 Y10.000",
            "G1 X20.000 Y26.000",
            "G1 X10.000 Y10.000",
            "M5",
        ]
    );
    assert!(gcode.contains("; Job size: 20.000mm x 16.000mm"));
}

#[test]
fn test_multiple_polylines_keep_order() {
    let a = Polyline::open(vec![Point::new(3.0, 3.0), Point::new(4.0, 3.0)]);
    let b = Polyline::open(vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)]);
    let engraver = VectorEngraver::new(vec![a, b], EngravingParameters::default()).unwrap();
    let gcode = engraver.generate_gcode().unwrap();

    let travels: Vec<_> = body(&gcode)
        .into_iter()
        .filter(|l| l.starts_with("G0 "))
        .collect();
    assert_eq!(travels, vec!["G0 X3.000 Y3.000", "G0 X0.000 Y0.000"]);
}

#[test]
fn test_empty_outline_is_rejected() {
    let err = VectorEngraver::new(Vec::new(), EngravingParameters::default()).unwrap_err();
    assert!(matches!(err, EngraveError::EmptyPath(_)));

    let err = VectorEngraver::new(
        vec![triangle(), Polyline::default()],
        EngravingParameters::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EngraveError::EmptyPath(_)));
}
