use thiserror::Error;

/// Errors returned by passport-photo operations.
#[derive(Debug, Error)]
pub enum PassportError {
    /// The input bytes are not a supported image.
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    /// The decoded image has zero width or height.
    #[error("image dimensions are zero")]
    ZeroDimensions,

    /// JPEG encoding failed.
    #[error("failed to encode image: {0}")]
    EncodeError(String),

    /// A landmark set did not contain exactly 68 points.
    #[error("expected 68 facial landmarks, got {0}")]
    InvalidLandmarkCount(usize),

    /// Crown and chin are less than a pixel apart (or not finite).
    #[error("head length of {0:.2}px is too small to normalize")]
    DegenerateHeadLength(f64),

    /// The chin lies above the crown.
    #[error("chin (y={chin_y:.1}) must lie below crown (y={crown_y:.1})")]
    InvertedHeadPoints {
        /// Crown Y coordinate.
        crown_y: f64,
        /// Chin Y coordinate.
        chin_y: f64,
    },

    /// The background remover failed or returned a mismatched mask.
    #[error("background removal failed: {0}")]
    BackgroundRemoval(String),

    /// The configuration does not describe a drawable frame.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JPEG quality outside 1-100.
    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),
}
