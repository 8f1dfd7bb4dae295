use image::{Rgb, RgbImage};

use super::*;

fn checkerboard(size: u32, cell: u32, invert: bool) -> RasterImage {
    let img = RgbImage::from_fn(size, size, |x, y| {
        let on = ((x / cell) + (y / cell)) % 2 == 0;
        if on ^ invert {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    RasterImage::from_rgb(img).unwrap()
}

fn gradient(w: u32, h: u32) -> RasterImage {
    RasterImage::from_rgb(RgbImage::from_fn(w, h, |x, y| {
        let v = ((x * 7 + y * 3) % 256) as u8;
        Rgb([v, v / 2, 255 - v])
    }))
    .unwrap()
}

#[test]
fn identical_images_score_exactly_one() {
    let s = SimilarityScorer::default();
    let g = gradient(64, 48);
    assert_eq!(s.score(&g, &g), 1.0);

    let flat = RasterImage::solid(200, 200, [128, 128, 128]).unwrap();
    assert_eq!(s.score(&flat, &flat.clone()), 1.0);
}

#[test]
fn inverted_structure_scores_near_zero() {
    let s = SimilarityScorer::default();
    let a = checkerboard(64, 8, false);
    let b = checkerboard(64, 8, true);
    assert!(s.score(&a, &b) < 0.1);
}

#[test]
fn score_is_symmetric_and_bounded() {
    let s = SimilarityScorer::default();
    let a = gradient(40, 40);
    let b = checkerboard(40, 5, false);
    let ab = s.score(&a, &b);
    let ba = s.score(&b, &a);
    assert!((ab - ba).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&ab));
}

#[test]
fn partial_change_scores_between_extremes() {
    let s = SimilarityScorer::default();
    let base = gradient(100, 100);
    let mut changed = base.as_rgb().clone();
    for y in 40..60 {
        for x in 40..60 {
            changed.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    let changed = RasterImage::from_rgb(changed).unwrap();
    let score = s.score(&base, &changed);
    assert!(score > 0.5, "score {score}");
    assert!(score < 0.99, "score {score}");
}

#[test]
fn tiny_images_shrink_the_window() {
    let s = SimilarityScorer::default();
    let a = RasterImage::solid(3, 2, [10, 10, 10]).unwrap();
    assert_eq!(s.score(&a, &a), 1.0);
    let b = RasterImage::solid(3, 2, [250, 250, 250]).unwrap();
    assert!(s.score(&a, &b) < 0.1);
}

#[test]
fn mismatched_sizes_are_normalized() {
    let s = SimilarityScorer::default();
    let a = RasterImage::solid(200, 200, [90, 90, 90]).unwrap();
    let b = RasterImage::solid(100, 120, [90, 90, 90]).unwrap();
    assert!(s.score(&a, &b) > 0.999);
}
