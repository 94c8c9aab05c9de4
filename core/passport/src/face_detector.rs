use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::PassportError;

/// Number of points in the anatomical landmark mesh.
pub const LANDMARK_COUNT: usize = 68;

const CHIN_TIP: usize = 8;
const LEFT_BROW_ARCH: usize = 19;
const RIGHT_BROW_ARCH: usize = 24;
const NOSE_TIP: usize = 30;

/// A pixel position in source-image space (origin top-left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate (pixels).
    pub x: f64,
    /// Vertical coordinate (pixels, growing downwards).
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of a detected face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
}

impl FaceBox {
    /// Whether `(x, y)` falls inside the box. Left/top edges are inclusive,
    /// right/bottom edges exclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Horizontal centre of the box.
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }
}

/// The 68-point facial landmark mesh returned by a detector.
///
/// Only the chin tip, both eyebrow arches and the nose tip are read by the
/// crate, but the full mesh is required so indices stay meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Wrap a landmark vector, rejecting anything but exactly 68 points.
    pub fn new(points: Vec<Point>) -> Result<Self, PassportError> {
        if points.len() != LANDMARK_COUNT {
            return Err(PassportError::InvalidLandmarkCount(points.len()));
        }
        Ok(Self { points })
    }

    /// All points in anatomical index order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Landmark 8.
    pub fn chin_tip(&self) -> Point {
        self.points[CHIN_TIP]
    }

    /// Landmark 19.
    pub fn left_brow_arch(&self) -> Point {
        self.points[LEFT_BROW_ARCH]
    }

    /// Landmark 24.
    pub fn right_brow_arch(&self) -> Point {
        self.points[RIGHT_BROW_ARCH]
    }

    /// Landmark 30.
    pub fn nose_tip(&self) -> Point {
        self.points[NOSE_TIP]
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = PassportError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LandmarkSet> for Vec<Point> {
    fn from(set: LandmarkSet) -> Self {
        set.points
    }
}

/// A single face detection: bounding box plus landmark mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    /// Bounding box of the face in source-image coordinates.
    #[serde(rename = "box")]
    pub face_box: FaceBox,
    /// 68-point landmark mesh in source-image coordinates.
    pub landmarks: LandmarkSet,
}

/// Pluggable face landmark backend.
///
/// Implement this trait to connect a landmark model (dlib, ONNX, a browser
/// model whose output was shipped over the wire, ...) and pass it to
/// [`crate::PassportPhoto::face_detector`].
pub trait FaceDetector: Send + Sync {
    /// Detect the most prominent face, or `None` when no face is found.
    fn detect(&self, image: &RgbaImage) -> Option<FaceLandmarks>;
}

/// Pluggable background segmentation backend.
///
/// The returned image must have the same dimensions as the input, with the
/// background made transparent. It is composited onto white before analysis.
pub trait BackgroundRemover: Send + Sync {
    /// Return an alpha-masked copy of `image`.
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage, PassportError>;
}

/// Replays a detection computed elsewhere, ignoring the image it is given.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedDetector {
    detection: Option<FaceLandmarks>,
}

impl PrecomputedDetector {
    /// Create a detector that always answers with `detection`.
    pub fn new(detection: Option<FaceLandmarks>) -> Self {
        Self { detection }
    }
}

impl FaceDetector for PrecomputedDetector {
    fn detect(&self, _image: &RgbaImage) -> Option<FaceLandmarks> {
        self.detection.clone()
    }
}
