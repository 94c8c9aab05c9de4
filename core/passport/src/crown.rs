use serde::{Deserialize, Serialize};

use crate::face_detector::{FaceLandmarks, Point};

/// Crown sits this many face lengths (brow line to chin) above the brows.
const CROWN_FACE_RATIO: f64 = 0.68;

/// Crown sits this fraction of the box height below the box top.
const CROWN_BOX_OFFSET: f64 = 0.03;

/// Forehead height as a multiple of the brow-to-nose-tip distance.
const FOREHEAD_FACTOR: f64 = 1.15;

/// Padding below the chin landmark, as a fraction of face length, to reach
/// the hard chin line.
const CHIN_PADDING: f64 = 0.06;

/// Half the head height assumed by the no-detection fallback, as a fraction
/// of image height.
const HEURISTIC_HALF_HEAD: f64 = 0.35;

/// Where a [`HeadGeometry`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSource {
    /// Estimated from a landmark detection.
    Detected,
    /// Entered by an operator.
    Manual,
    /// Crude centred guess used when no face was found. Never a verified result.
    Heuristic,
}

/// Head-top and chin reference points plus the horizontal centring anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadGeometry {
    /// Estimated top of the head.
    pub crown: Point,
    /// Padded chin line.
    pub chin: Point,
    /// X coordinate the output is centred on.
    pub face_center_x: f64,
    /// Provenance of the points.
    pub source: PointSource,
}

impl HeadGeometry {
    /// Vertical crown-to-chin distance, signed (positive when the chin is
    /// below the crown).
    pub fn head_length(&self) -> f64 {
        self.chin.y - self.crown.y
    }
}

/// The three independent crown-Y estimates that get median-fused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrownSignals {
    /// Anthropometric face-length ratio above the brow line.
    pub by_ratio: f64,
    /// Fixed offset below the detector's box top.
    pub by_box: f64,
    /// Forehead extrapolated from the brow-to-nose distance.
    pub by_forehead: f64,
}

impl CrownSignals {
    /// Median of the three signals.
    pub fn fused(&self) -> f64 {
        median3(self.by_ratio, self.by_box, self.by_forehead)
    }
}

/// Middle value of three.
pub fn median3(a: f64, b: f64, c: f64) -> f64 {
    let mut values = [a, b, c];
    values.sort_by(|x, y| x.total_cmp(y));
    values[1]
}

fn brow_line_y(face: &FaceLandmarks) -> f64 {
    (face.landmarks.left_brow_arch().y + face.landmarks.right_brow_arch().y) / 2.0
}

/// Compute the three crown signals for a detection.
pub fn crown_signals(face: &FaceLandmarks) -> CrownSignals {
    let brows_y = brow_line_y(face);
    let face_len = face.landmarks.chin_tip().y - brows_y;
    let nose = face.landmarks.nose_tip();

    CrownSignals {
        by_ratio: brows_y - face_len * CROWN_FACE_RATIO,
        by_box: face.face_box.y + face.face_box.height * CROWN_BOX_OFFSET,
        by_forehead: brows_y - (brows_y - nose.y).abs() * FOREHEAD_FACTOR,
    }
}

/// Estimate crown and chin from a landmark detection.
pub fn estimate_head(face: &FaceLandmarks) -> HeadGeometry {
    let brows_y = brow_line_y(face);
    let chin_tip = face.landmarks.chin_tip();
    let face_len = chin_tip.y - brows_y;

    HeadGeometry {
        crown: Point::new(face.face_box.center_x(), crown_signals(face).fused()),
        chin: Point::new(chin_tip.x, chin_tip.y + face_len * CHIN_PADDING),
        face_center_x: face.landmarks.nose_tip().x,
        source: PointSource::Detected,
    }
}

/// Centred guess used when no face is detected.
pub fn heuristic_head(width: u32, height: u32) -> HeadGeometry {
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    let half = height as f64 * HEURISTIC_HALF_HEAD;
    HeadGeometry {
        crown: Point::new(cx, cy - half),
        chin: Point::new(cx, cy + half),
        face_center_x: cx,
        source: PointSource::Heuristic,
    }
}

/// Operator-supplied points, centred on the crown/chin midpoint.
pub fn manual_head(crown: Point, chin: Point) -> HeadGeometry {
    HeadGeometry {
        crown,
        chin,
        face_center_x: (crown.x + chin.x) / 2.0,
        source: PointSource::Manual,
    }
}

/// Fraction of the image height spanned by the head.
pub fn head_ratio(geometry: &HeadGeometry, image_height: u32) -> Option<f64> {
    if image_height == 0 {
        return None;
    }
    Some(geometry.head_length().abs() / image_height as f64)
}
