//! Render final and preview photos for a few synthetic off-centre portraits.
//!
//! Usage:
//!   cargo run --example generate_samples
//!
//! Output goes to `$TMPDIR/passport-samples/`.

use image::{DynamicImage, Rgb, RgbImage};
use passport_photo::{
    FaceBox, FaceLandmarks, LandmarkSet, PassportPhoto, Point, PrecomputedDetector, RenderMode,
};
use std::path::Path;

/// Head oval centred at `(cx, cy)` with radii `(rx, ry)` on a light grey wall.
fn portrait(width: u32, height: u32, cx: f64, cy: f64, rx: f64, ry: f64) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let dx = (x as f64 - cx) / rx;
        let dy = (y as f64 - cy) / ry;
        if dx * dx + dy * dy <= 1.0 {
            Rgb([196, 150, 120])
        } else {
            Rgb([235, 235, 232])
        }
    })
}

fn detection(cx: f64, cy: f64, rx: f64, ry: f64) -> FaceLandmarks {
    let mut points = vec![Point::new(cx, cy); 68];
    points[8] = Point::new(cx, cy + ry * 0.93);
    points[19] = Point::new(cx - rx * 0.35, cy - ry * 0.25);
    points[24] = Point::new(cx + rx * 0.35, cy - ry * 0.25);
    points[30] = Point::new(cx, cy + ry * 0.25);
    FaceLandmarks {
        face_box: FaceBox {
            x: cx - rx,
            y: cy - ry,
            width: rx * 2.0,
            height: ry * 2.0,
        },
        landmarks: LandmarkSet::new(points).expect("68 points"),
    }
}

fn process(tag: &str, image: RgbImage, face: FaceLandmarks, output_dir: &Path) {
    let photo = PassportPhoto::from_dynamic(DynamicImage::ImageRgb8(image))
        .unwrap()
        .face_detector(Box::new(PrecomputedDetector::new(Some(face))));

    for (mode, suffix) in [(RenderMode::Final, "final"), (RenderMode::Preview, "preview")] {
        let output = photo.compose(mode).unwrap();
        let filename = format!("{tag}_{suffix}.jpg");
        std::fs::write(output_dir.join(&filename), &output.data).unwrap();
        println!(
            "  {suffix}: {filename} ({width}x{height}, {size} bytes)",
            width = output.width,
            height = output.height,
            size = output.data.len(),
        );
    }

    let analysis = photo.analyze().unwrap();
    println!("  scores: {:?}", analysis.scores);
    for advice in &analysis.advisories {
        println!("  - {advice}");
    }
}

fn main() {
    let output_dir = std::env::temp_dir().join("passport-samples");
    std::fs::create_dir_all(&output_dir).expect("failed to create output directory");

    let samples = [
        ("centered", 800, 1000, 400.0, 450.0, 170.0, 240.0),
        ("left", 1200, 900, 300.0, 420.0, 120.0, 170.0),
        ("small_head", 1000, 1400, 600.0, 500.0, 80.0, 110.0),
        ("large_head", 600, 700, 300.0, 360.0, 250.0, 330.0),
    ];

    for (tag, w, h, cx, cy, rx, ry) in samples {
        println!("=== {tag} ({w}x{h}) ===");
        process(
            tag,
            portrait(w, h, cx, cy, rx, ry),
            detection(cx, cy, rx, ry),
            &output_dir,
        );
        println!();
    }

    println!("Output written to {}", output_dir.display());
}
