use super::*;

fn with_block(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RasterImage {
    let img = RgbImage::from_fn(w, h, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    RasterImage::from_rgb(img).unwrap()
}

#[test]
fn white_block_centroid_is_block_center() {
    let reference = RasterImage::solid(100, 100, [0, 0, 0]).unwrap();
    let candidate = with_block(100, 100, 40, 40, 60, 60);

    let report = DiscrepancyLocalizer::default()
        .localize(&reference, &candidate)
        .unwrap();
    assert_eq!(report.centroid, Point::new(50.0, 50.0));
    assert_eq!(report.area, 400);
    assert_eq!(report.extent, (100, 100));
    assert!((report.spread_x() - report.spread_y()).abs() < 1e-9);
}

#[test]
fn identical_images_have_no_discrepancy() {
    let img = with_block(32, 32, 4, 4, 10, 10);
    assert!(DiscrepancyLocalizer::default().localize(&img, &img).is_none());
}

#[test]
fn differences_below_threshold_are_ignored() {
    let a = RasterImage::solid(20, 20, [100, 100, 100]).unwrap();
    let b = RasterImage::solid(20, 20, [140, 140, 140]).unwrap();
    assert!(DiscrepancyLocalizer::default().localize(&a, &b).is_none());
    assert!(DiscrepancyLocalizer::new(30).localize(&a, &b).is_some());
}

#[test]
fn zero_difference_region_reports_nothing() {
    let zero = RasterImage::solid(16, 16, [0, 0, 0]).unwrap();
    assert!(
        DiscrepancyLocalizer::default()
            .localize(&zero, &zero.clone())
            .is_none()
    );
}

#[test]
fn wide_region_has_larger_horizontal_spread() {
    let reference = RasterImage::solid(100, 100, [0, 0, 0]).unwrap();
    let wide = with_block(100, 100, 10, 45, 90, 55);
    let tall = with_block(100, 100, 45, 10, 55, 90);

    let lz = DiscrepancyLocalizer::default();
    let w = lz.localize(&reference, &wide).unwrap();
    let t = lz.localize(&reference, &tall).unwrap();
    assert!(w.spread_x() > w.spread_y());
    assert!(t.spread_y() > t.spread_x());
}

#[test]
fn mask_is_binary() {
    let reference = RasterImage::solid(10, 10, [0, 0, 0]).unwrap();
    let candidate = with_block(10, 10, 0, 0, 5, 10);
    let mask = DiscrepancyLocalizer::default().difference_mask(&reference, &candidate);
    assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    assert_eq!(mask.pixels().filter(|p| p.0[0] == 255).count(), 50);
}

#[test]
fn centroid_rescales_to_canvas() {
    let report = DiscrepancyReport {
        centroid: Point::new(25.0, 10.0),
        spread: Vec2::ZERO,
        area: 1,
        extent: (100, 50),
    };
    let canvas = Canvas::new(1920, 1080).unwrap();
    assert_eq!(report.centroid_on(canvas), Point::new(480.0, 216.0));
}
