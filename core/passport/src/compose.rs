use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use crate::error::PassportError;
use crate::normalize::{CanvasSpec, NormalizationTransform};

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Preview guide colour for the crown and chin lines.
const GUIDE_COLOR: Rgb<u8> = Rgb([230, 40, 40]);

/// Flatten alpha channel by compositing onto a white background.
pub(crate) fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    let rgba: RgbaImage = image.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let mut rgb = RgbImage::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;
        let out_r = (r as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        let out_g = (g as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        let out_b = (b as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        rgb.put_pixel(x, y, Rgb([out_r, out_g, out_b]));
    }

    rgb
}

/// Copy of `source` with its last column and row repeated once.
///
/// Bilinear sampling needs a right and bottom neighbour; without the extra
/// edge the last source row and column would sample as background.
fn pad_edges(source: &RgbImage) -> RgbImage {
    let (width, height) = source.dimensions();
    let (max_x, max_y) = (width.saturating_sub(1), height.saturating_sub(1));
    RgbImage::from_fn(width + 1, height + 1, |x, y| {
        *source.get_pixel(x.min(max_x), y.min(max_y))
    })
}

/// Draw the whole source through `transform` onto a white canvas.
///
/// The canvas is filled white before drawing, so anything the scaled source
/// does not cover stays white. Source pixel `(u, v)` covers the canvas area
/// `[u*scale + dx, (u+1)*scale + dx) x [v*scale + dy, (v+1)*scale + dy)`.
pub(crate) fn rasterize(
    source: &RgbImage,
    transform: &NormalizationTransform,
    canvas: &CanvasSpec,
) -> RgbImage {
    let mut out = RgbImage::from_pixel(canvas.width, canvas.height, WHITE);
    if source.width() == 0 || source.height() == 0 {
        return out;
    }
    let padded = pad_edges(source);
    let projection = Projection::translate(transform.dx as f32, transform.dy as f32)
        * Projection::scale(transform.scale as f32, transform.scale as f32);
    warp_into(&padded, &projection, Interpolation::Bilinear, WHITE, &mut out);
    out
}

/// Overlay the crown and chin target lines used by the on-screen preview.
pub(crate) fn draw_guides(image: &mut RgbImage, canvas: &CanvasSpec) {
    let right = image.width().saturating_sub(1) as f32;
    for y in [canvas.crown_top_px, canvas.chin_line_px()] {
        if y < image.height() {
            draw_line_segment_mut(image, (0.0, y as f32), (right, y as f32), GUIDE_COLOR);
        }
    }
}

/// Encode an RGB image as baseline JPEG at `quality` (1–100).
pub(crate) fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, PassportError> {
    if !(1..=100).contains(&quality) {
        return Err(PassportError::InvalidQuality(quality));
    }
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| PassportError::EncodeError(e.to_string()))?;
    Ok(buffer)
}

/// File name for an exported photo: `passport_<W>x<H>_<unix millis>.jpg`.
pub fn export_file_name(width: u32, height: u32, timestamp: DateTime<Utc>) -> String {
    format!(
        "passport_{width}x{height}_{}.jpg",
        timestamp.timestamp_millis()
    )
}
