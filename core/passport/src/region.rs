//! Background, exposure and sharpness scoring over a coarse sample grid.

use image::RgbaImage;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::face_detector::FaceBox;
use crate::metrics::{
    grayscale, laplacian_variance, mean_and_variance, mean_luminance, whiteness,
};

/// Mean luma at which exposure scores 100.
const IDEAL_EXPOSURE: f64 = 0.55;

/// Fallback face region when no detection is available, as fractions of the
/// image size: (left, top, width, height).
const FALLBACK_FACE_REGION: (f64, f64, f64, f64) = (0.30, 0.25, 0.40, 0.50);

/// Raw region scores on a nominal 0–100 scale.
///
/// `exposure` is not floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionScores {
    /// How white the background samples are.
    pub bg_whiteness: i32,
    /// How evenly lit the background samples are.
    pub bg_uniformity: i32,
    /// Closeness of mean luma to the calibrated ideal.
    pub exposure: i32,
    /// Log-scaled Laplacian variance.
    pub sharpness: i32,
    /// Number of background samples that fed the two background scores.
    pub background_samples: usize,
}

/// Rectangle excluded from background sampling.
pub fn exclusion_rect(width: u32, height: u32, face: Option<&FaceBox>) -> FaceBox {
    match face {
        Some(face) => *face,
        None => {
            let (w, h) = (width as f64, height as f64);
            let (left, top, fw, fh) = FALLBACK_FACE_REGION;
            FaceBox {
                x: w * left,
                y: h * top,
                width: w * fw,
                height: h * fh,
            }
        }
    }
}

/// Grid stride that keeps the sample count roughly resolution independent.
pub fn sample_stride(width: u32, height: u32) -> u32 {
    (width.min(height) / 200).max(2)
}

/// Score background, exposure and sharpness of `image`.
///
/// Background statistics skip samples inside `face` (or the fallback face
/// region). Exposure and sharpness cover the whole image.
pub fn analyze_regions(image: &RgbaImage, face: Option<&FaceBox>) -> RegionScores {
    let (width, height) = image.dimensions();
    let excluded = exclusion_rect(width, height, face);
    let step = sample_stride(width, height) as usize;

    let mut samples = Vec::new();
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            if excluded.contains(x as f64, y as f64) {
                continue;
            }
            let [r, g, b, _] = image.get_pixel(x, y).0;
            samples.push(whiteness(r, g, b));
        }
    }

    let (bg_whiteness, bg_uniformity) = if samples.is_empty() {
        warn!("no background samples outside the face region ({width}x{height})");
        (0, 0)
    } else {
        let (mean, variance) = mean_and_variance(&samples);
        (
            (mean * 100.0).round() as i32,
            ((1.0 - (variance * 4.0).clamp(0.0, 1.0)) * 100.0).round() as i32,
        )
    };

    let gray = grayscale(image);
    let avg_lum = mean_luminance(&gray);
    let exposure =
        ((1.0 - (avg_lum - IDEAL_EXPOSURE).abs() / IDEAL_EXPOSURE) * 100.0).round() as i32;

    let lap_var = laplacian_variance(&gray);
    let sharpness = (((lap_var + 1.0).log10() / 3.0).clamp(0.0, 1.0) * 100.0).round() as i32;

    debug!(
        "region scores: whiteness={bg_whiteness} uniformity={bg_uniformity} \
         exposure={exposure} (lum {avg_lum:.3}) sharpness={sharpness} (lap var {lap_var:.1}), \
         {} samples at stride {step}",
        samples.len()
    );

    RegionScores {
        bg_whiteness,
        bg_uniformity,
        exposure,
        sharpness,
        background_samples: samples.len(),
    }
}
