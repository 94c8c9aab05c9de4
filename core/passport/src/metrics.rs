//! Per-pixel colour math and the discrete Laplacian.
//!
//! Everything here is pure. Statistics over empty sets report `0.0` so that
//! tiny or empty rasters degrade to a defined score instead of `NaN`.

use image::{GrayImage, Luma, RgbaImage};

const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Rec. 601 luma in the `0..=255` range.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}

/// Luma normalized to `0..=1`.
#[inline]
pub fn luminance_norm(r: u8, g: u8, b: u8) -> f64 {
    luminance(r, g, b) / 255.0
}

/// HSV-style saturation `(max - min) / max`, `0` for black.
#[inline]
pub fn saturation(r: u8, g: u8, b: u8) -> f64 {
    let max = r.max(g).max(b) as f64;
    let min = r.min(g).min(b) as f64;
    if max == 0.0 {
        0.0
    } else {
        (max - min) / max
    }
}

/// How close a pixel is to pure white: bright and unsaturated.
#[inline]
pub fn whiteness(r: u8, g: u8, b: u8) -> f64 {
    (1.0 - saturation(r, g, b)) * luminance_norm(r, g, b)
}

/// One rounded luma byte per pixel, alpha ignored.
pub fn grayscale(image: &RgbaImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        let value = luminance(r, g, b).round().clamp(0.0, 255.0) as u8;
        gray.put_pixel(x, y, Luma([value]));
    }
    gray
}

/// 4-neighbour Laplacian at `(x, y)`. `None` on the one-pixel border.
pub fn laplacian_response(gray: &GrayImage, x: u32, y: u32) -> Option<f64> {
    let (w, h) = gray.dimensions();
    if x < 1 || y < 1 || x + 1 >= w || y + 1 >= h {
        return None;
    }
    let at = |x: u32, y: u32| gray.get_pixel(x, y).0[0] as f64;
    Some(-4.0 * at(x, y) + at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1))
}

/// Population variance of the Laplacian over all interior pixels.
///
/// Returns `0.0` when the raster is smaller than 3×3.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }
    let responses: Vec<f64> = (1..h - 1)
        .flat_map(|y| (1..w - 1).map(move |x| (x, y)))
        .filter_map(|(x, y)| laplacian_response(gray, x, y))
        .collect();
    mean_and_variance(&responses).1
}

/// Mean normalized luma of a grayscale raster, `0.0` if it is empty.
pub fn mean_luminance(gray: &GrayImage) -> f64 {
    let count = gray.as_raw().len();
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.as_raw().iter().map(|&v| v as u64).sum();
    sum as f64 / count as f64 / 255.0
}

/// Mean and population variance, `(0.0, 0.0)` for an empty slice.
pub fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance)
}
