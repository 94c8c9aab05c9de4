//! Uniform scale + translation that places the head inside the output frame.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::crown::HeadGeometry;
use crate::error::PassportError;
use crate::face_detector::Point;

/// Output frame geometry. The background outside the drawn source is white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasSpec {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Crown-to-chin distance in the output, in pixels.
    pub head_height_px: u32,
    /// Distance from the top edge to the crown, in pixels.
    pub crown_top_px: u32,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 413,
            height: 531,
            head_height_px: 380,
            crown_top_px: 30,
        }
    }
}

impl CanvasSpec {
    /// Y coordinate of the chin line in the output.
    pub fn chin_line_px(&self) -> u32 {
        self.crown_top_px + self.head_height_px
    }
}

/// `dst = src * scale + (dx, dy)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationTransform {
    /// Uniform scale factor, always positive.
    pub scale: f64,
    /// Horizontal translation applied after scaling.
    pub dx: f64,
    /// Vertical translation applied after scaling.
    pub dy: f64,
}

impl NormalizationTransform {
    /// Map a source-space point into canvas space.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.dx, p.y * self.scale + self.dy)
    }
}

/// Compute the transform that puts the crown at `crown_top_px`, scales the
/// head to `head_height_px` and centres `face_center_x` horizontally.
///
/// Fails when the head is shorter than one pixel or upside down.
pub fn compute_transform(
    geometry: &HeadGeometry,
    canvas: &CanvasSpec,
) -> Result<NormalizationTransform, PassportError> {
    let head_len = geometry.head_length();
    if head_len.abs() < 1.0 || !head_len.is_finite() {
        return Err(PassportError::DegenerateHeadLength(head_len.abs()));
    }
    if head_len < 0.0 {
        return Err(PassportError::InvertedHeadPoints {
            crown_y: geometry.crown.y,
            chin_y: geometry.chin.y,
        });
    }

    let scale = canvas.head_height_px as f64 / head_len;
    let transform = NormalizationTransform {
        scale,
        dx: canvas.width as f64 / 2.0 - geometry.face_center_x * scale,
        dy: canvas.crown_top_px as f64 - geometry.crown.y * scale,
    };
    debug!(
        "normalize: head {head_len:.1}px -> scale {:.4}, offset ({:.1}, {:.1})",
        transform.scale, transform.dx, transform.dy
    );
    Ok(transform)
}
