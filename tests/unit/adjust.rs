use crate::foundation::core::{Alignment, Point, Vec2};

use super::*;

fn canvas() -> Canvas {
    Canvas::new(200, 100).unwrap()
}

fn report(cx: f64, cy: f64, spread: Vec2) -> DiscrepancyReport {
    DiscrepancyReport {
        centroid: Point::new(cx, cy),
        spread,
        area: 10,
        extent: (200, 100),
    }
}

fn start() -> Transform {
    Transform {
        position_x: 50.0,
        position_y: 40.0,
        rotation: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        crop_left: 3,
        crop_right: 4,
        crop_top: 5,
        crop_bottom: 6,
        alignment: Alignment::TOP_LEFT,
    }
}

#[test]
fn centroid_past_midpoint_moves_back() {
    let adj = TransformAdjuster::new(5.0);
    let next = adj.adjust_one(&start(), &report(150.0, 80.0, Vec2::new(1.0, 1.0)), canvas());
    assert_eq!(next.position_x, 45.0);
    assert_eq!(next.position_y, 35.0);
}

#[test]
fn centroid_before_midpoint_moves_forward() {
    let adj = TransformAdjuster::new(5.0);
    let next = adj.adjust_one(&start(), &report(10.0, 50.0, Vec2::new(1.0, 1.0)), canvas());
    assert_eq!(next.position_x, 55.0);
    // exactly on the midpoint is not "past" it
    assert_eq!(next.position_y, 45.0);
}

#[test]
fn scale_follows_elongation() {
    let adj = TransformAdjuster::new(5.0);
    let wide = adj.adjust_one(&start(), &report(0.0, 0.0, Vec2::new(9.0, 1.0)), canvas());
    assert!((wide.scale_x - 1.05).abs() < 1e-12);
    assert!((wide.scale_y - 0.95).abs() < 1e-12);

    let tall = adj.adjust_one(&start(), &report(0.0, 0.0, Vec2::new(1.0, 9.0)), canvas());
    assert!((tall.scale_x - 0.95).abs() < 1e-12);
    assert!((tall.scale_y - 1.05).abs() < 1e-12);

    let even = adj.adjust_one(&start(), &report(0.0, 0.0, Vec2::new(4.0, 4.0)), canvas());
    assert!((even.scale_x - 0.95).abs() < 1e-12);
    assert!((even.scale_y - 0.95).abs() < 1e-12);
}

#[test]
fn passthrough_fields_are_untouched() {
    let adj = TransformAdjuster::new(5.0);
    let next = adj.adjust_one(&start(), &report(150.0, 80.0, Vec2::new(2.0, 1.0)), canvas());
    let s = start();
    assert_eq!(next.rotation, s.rotation);
    assert_eq!(
        (next.crop_left, next.crop_right, next.crop_top, next.crop_bottom),
        (s.crop_left, s.crop_right, s.crop_top, s.crop_bottom)
    );
    assert_eq!(next.alignment, s.alignment);
}

#[test]
fn repeated_identical_discrepancy_moves_monotonically() {
    let adj = TransformAdjuster::new(5.0);
    let r = report(180.0, 90.0, Vec2::new(1.0, 2.0));
    let mut t = start();
    let mut prev = t.position_x;
    for _ in 0..10 {
        t = adj.adjust_one(&t, &r, canvas());
        assert!(t.position_x < prev);
        prev = t.position_x;
    }
    assert_eq!(t.position_x, 0.0);
}

#[test]
fn adjust_treats_every_source_identically() {
    let adj = TransformAdjuster::new(2.0);
    let mut other = start();
    other.position_x = 500.0;
    let sources = vec![("a", start()), ("b", other)];
    let out = adj.adjust(&sources, &report(150.0, 10.0, Vec2::new(1.0, 0.0)), canvas());
    assert_eq!(out[0].0, "a");
    assert_eq!(out[1].0, "b");
    assert_eq!(out[0].1.position_x - start().position_x, -2.0);
    assert_eq!(out[1].1.position_x - other.position_x, -2.0);
}

#[test]
fn centroid_is_compared_in_canvas_space() {
    // x = 40 in a 50 px wide grid lands at 160 on the 200 px canvas.
    let adj = TransformAdjuster::new(1.0);
    let mut r = report(40.0, 10.0, Vec2::ZERO);
    r.extent = (50, 100);
    let next = adj.adjust_one(&start(), &r, canvas());
    assert_eq!(next.position_x, 49.0);
}
