//! Passport photo normalization: frame a portrait to a fixed head size and
//! position, and score it against compliance heuristics.
//!
//! # Example
//!
//! ```no_run
//! use passport_photo::{PassportPhoto, PrecomputedDetector, RenderMode};
//!
//! let raw_bytes = std::fs::read("portrait.jpg").unwrap();
//! let detection = serde_json::from_slice(&std::fs::read("face.json").unwrap()).unwrap();
//! let output = PassportPhoto::new(raw_bytes)
//!     .unwrap()
//!     .face_detector(Box::new(PrecomputedDetector::new(Some(detection))))
//!     .compose(RenderMode::Final)
//!     .unwrap();
//! println!("{}: {} bytes", output.file_name, output.data.len());
//! for advice in &output.analysis.advisories {
//!     println!("- {advice}");
//! }
//! ```
#![warn(missing_docs)]

mod compose;
/// Threshold checks and operator advice.
pub mod compliance;
/// Pipeline configuration.
pub mod config;
/// Crown and chin estimation from landmarks.
pub mod crown;
mod error;
/// Face detection and background segmentation traits and data types.
pub mod face_detector;
/// JFIF resolution metadata patching.
pub mod jfif;
/// Per-pixel colour metrics and the discrete Laplacian.
pub mod metrics;
/// Output frame geometry and the normalization transform.
pub mod normalize;
/// Background, exposure and sharpness scoring.
pub mod region;

use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage, RgbaImage};
use log::{debug, warn};
use serde::Serialize;

/// File naming for exported photos.
pub use compose::export_file_name;
/// Compliance summary, advice and thresholds.
pub use compliance::{Advisory, ComplianceThresholds, QualityScores};
/// Pipeline configuration and output selection.
pub use config::{PassportConfig, RenderMode};
/// Head reference points and their provenance.
pub use crown::{HeadGeometry, PointSource};
/// Error type returned by passport-photo operations.
pub use error::PassportError;
/// Detection traits and the data types they exchange.
pub use face_detector::{
    BackgroundRemover, FaceBox, FaceDetector, FaceLandmarks, LandmarkSet, Point,
    PrecomputedDetector,
};
/// Output frame and transform types.
pub use normalize::{CanvasSpec, NormalizationTransform};
/// Raw region scores.
pub use region::RegionScores;

/// Everything learned about a source photo before it is rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Width of the source image in pixels.
    pub source_width: u32,

    /// Height of the source image in pixels.
    pub source_height: u32,

    /// Raw detector output, if a face was found.
    pub detection: Option<FaceLandmarks>,

    /// Crown, chin and centring anchor used for normalization.
    pub geometry: HeadGeometry,

    /// Background, exposure and sharpness scores.
    pub region: RegionScores,

    /// Compliance summary.
    pub scores: QualityScores,

    /// Operator advice derived from `scores`.
    pub advisories: Vec<Advisory>,

    /// Normalization transform, or `None` when the geometry cannot be
    /// normalized (head shorter than a pixel, or chin above crown).
    pub transform: Option<NormalizationTransform>,
}

impl Analysis {
    /// `true` when the head points come from a detection or an operator
    /// rather than the centred fallback guess.
    pub fn is_verified(&self) -> bool {
        self.geometry.source != PointSource::Heuristic
    }
}

/// A rendered passport photo.
#[derive(Debug, Clone)]
pub struct PassportOutput {
    /// JPEG bytes.
    pub data: Vec<u8>,

    /// Which artifact this is.
    pub mode: RenderMode,

    /// Width of the output image in pixels.
    pub width: u32,

    /// Height of the output image in pixels.
    pub height: u32,

    /// Suggested file name, `passport_<W>x<H>_<millis>.jpg`.
    pub file_name: String,

    /// The analysis the rendering was based on.
    pub analysis: Analysis,
}

/// A flattened working image and its analysis, ready to render.
#[derive(Debug, Clone)]
pub struct Prepared {
    working: RgbImage,
    analysis: Analysis,
}

impl Prepared {
    /// The analysis every render of this image shares.
    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }
}

/// Builder that turns a portrait into a passport photo.
///
/// Decodes the input on construction. Detection and segmentation backends are
/// injected, so one configured builder is the whole processing context.
pub struct PassportPhoto {
    image: DynamicImage,
    config: PassportConfig,
    manual: Option<(Point, Point)>,
    detector: Option<Box<dyn FaceDetector>>,
    remover: Option<Box<dyn BackgroundRemover>>,
}

impl PassportPhoto {
    /// Create a builder from raw image bytes (JPEG, PNG, or WebP).
    pub fn new(input: Vec<u8>) -> Result<Self, PassportError> {
        let image =
            image::load_from_memory(&input).map_err(|e| PassportError::DecodeError(e.to_string()))?;
        Self::from_dynamic(image)
    }

    /// Create a builder from an already decoded image.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self, PassportError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(PassportError::ZeroDimensions);
        }
        Ok(Self {
            image,
            config: PassportConfig::default(),
            manual: None,
            detector: None,
            remover: None,
        })
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: PassportConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the resolution written into the final JPEG (default: 300).
    pub fn target_dpi(mut self, dpi: u16) -> Self {
        self.config.target_dpi = dpi;
        self
    }

    /// Use operator-entered crown and chin points instead of detection.
    ///
    /// The output is centred on the midpoint of the two X coordinates.
    pub fn manual_points(mut self, crown: Point, chin: Point) -> Self {
        self.manual = Some((crown, chin));
        self
    }

    /// Provide the face landmark backend.
    ///
    /// Without one (and without manual points) the photo is framed with a
    /// centred guess and [`Analysis::is_verified`] reports `false`.
    ///
    /// ```no_run
    /// use passport_photo::{FaceDetector, FaceLandmarks, PassportPhoto};
    ///
    /// struct MyDetector;
    /// impl FaceDetector for MyDetector {
    ///     fn detect(&self, image: &image::RgbaImage) -> Option<FaceLandmarks> {
    ///         // Run a landmark model here
    ///         None
    ///     }
    /// }
    ///
    /// let bytes = std::fs::read("portrait.jpg").unwrap();
    /// let analysis = PassportPhoto::new(bytes).unwrap()
    ///     .face_detector(Box::new(MyDetector))
    ///     .analyze().unwrap();
    /// ```
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Provide a background segmentation backend. Its output is composited
    /// onto white before detection and scoring.
    pub fn background_remover(mut self, remover: Box<dyn BackgroundRemover>) -> Self {
        self.remover = Some(remover);
        self
    }

    /// Detect, estimate and score without rendering.
    pub fn analyze(&self) -> Result<Analysis, PassportError> {
        self.prepare().map(|prepared| prepared.analysis)
    }

    /// Render the photo with the current time in the file name.
    pub fn compose(&self, mode: RenderMode) -> Result<PassportOutput, PassportError> {
        self.compose_at(mode, Utc::now())
    }

    /// Render the photo, stamping `timestamp` into the file name.
    pub fn compose_at(
        &self,
        mode: RenderMode,
        timestamp: DateTime<Utc>,
    ) -> Result<PassportOutput, PassportError> {
        self.config.validate()?;
        let prepared = self.prepare()?;
        self.render(&prepared, mode, timestamp)
    }

    /// Render a photo from an earlier [`PassportPhoto::prepare`].
    ///
    /// Preview and final renders share the transform; they differ only in
    /// JPEG quality, guide lines and the DPI patch. Rendering several modes
    /// from one [`Prepared`] runs segmentation and detection once.
    pub fn render(
        &self,
        prepared: &Prepared,
        mode: RenderMode,
        timestamp: DateTime<Utc>,
    ) -> Result<PassportOutput, PassportError> {
        self.config.validate()?;
        let canvas = &self.config.canvas;
        let analysis = &prepared.analysis;

        let transform = normalize::compute_transform(&analysis.geometry, canvas)?;
        let mut framed = compose::rasterize(&prepared.working, &transform, canvas);
        if mode == RenderMode::Preview {
            compose::draw_guides(&mut framed, canvas);
        }

        let mut data = compose::encode_jpeg(&framed, self.config.quality_for(mode))?;
        if mode == RenderMode::Final {
            data = jfif::set_density_dpi(&data, self.config.target_dpi);
        }
        debug!(
            "composed {mode:?} {}x{} ({} bytes)",
            framed.width(),
            framed.height(),
            data.len()
        );

        Ok(PassportOutput {
            data,
            mode,
            width: framed.width(),
            height: framed.height(),
            file_name: export_file_name(framed.width(), framed.height(), timestamp),
            analysis: analysis.clone(),
        })
    }

    /// Background removal → white flatten → detection → geometry → scores.
    pub fn prepare(&self) -> Result<Prepared, PassportError> {
        let (width, height) = (self.image.width(), self.image.height());

        let working = match &self.remover {
            Some(remover) => {
                let masked = remover.remove_background(&self.image.to_rgba8())?;
                if masked.dimensions() != (width, height) {
                    return Err(PassportError::BackgroundRemoval(format!(
                        "expected {width}x{height} mask, got {}x{}",
                        masked.width(),
                        masked.height()
                    )));
                }
                compose::flatten_alpha(&DynamicImage::ImageRgba8(masked))
            }
            None => compose::flatten_alpha(&self.image),
        };
        let working_rgba: RgbaImage = DynamicImage::ImageRgb8(working.clone()).to_rgba8();

        let detection = self
            .detector
            .as_ref()
            .and_then(|detector| detector.detect(&working_rgba));

        let geometry = match (self.manual, &detection) {
            (Some((crown, chin)), _) => crown::manual_head(crown, chin),
            (None, Some(face)) => crown::estimate_head(face),
            (None, None) => {
                warn!("no face detected in {width}x{height} image; using centred estimate");
                crown::heuristic_head(width, height)
            }
        };

        let region = region::analyze_regions(
            &working_rgba,
            detection.as_ref().map(|face| &face.face_box),
        );

        let thresholds = &self.config.thresholds;
        let verified = geometry.source != PointSource::Heuristic;
        let scores = compliance::score(
            verified.then_some(&geometry),
            height,
            Some(&region),
            thresholds,
        );
        let advisories = compliance::advisories(&scores, thresholds);

        let transform = match normalize::compute_transform(&geometry, &self.config.canvas) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("cannot normalize: {e}");
                None
            }
        };

        Ok(Prepared {
            working,
            analysis: Analysis {
                source_width: width,
                source_height: height,
                detection,
                geometry,
                region,
                scores,
                advisories,
                transform,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_detector::LANDMARK_COUNT;
    use image::{Rgb, Rgba};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn make_test_png(width: u32, height: u32) -> Vec<u8> {
        use image::codecs::png::PngEncoder;
        use image::ImageEncoder;

        let mut img = RgbImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ]);
        }
        let mut buffer = Vec::new();
        let encoder = PngEncoder::new(&mut buffer);
        encoder
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        buffer
    }

    fn detection(width: f64, height: f64) -> FaceLandmarks {
        let cx = width / 2.0;
        let mut points = vec![Point::new(cx, height / 2.0); LANDMARK_COUNT];
        points[8] = Point::new(cx, height * 0.70);
        points[19] = Point::new(cx - 20.0, height * 0.40);
        points[24] = Point::new(cx + 20.0, height * 0.40);
        points[30] = Point::new(cx, height * 0.55);
        FaceLandmarks {
            face_box: FaceBox {
                x: cx - width * 0.2,
                y: height * 0.2,
                width: width * 0.4,
                height: height * 0.55,
            },
            landmarks: LandmarkSet::new(points).unwrap(),
        }
    }

    struct ClearEverything;

    impl BackgroundRemover for ClearEverything {
        fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage, PassportError> {
            Ok(RgbaImage::from_pixel(
                image.width(),
                image.height(),
                Rgba([0, 0, 0, 0]),
            ))
        }
    }

    struct CountingRemover(Arc<AtomicUsize>);

    impl BackgroundRemover for CountingRemover {
        fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage, PassportError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(image.clone())
        }
    }

    struct WrongSize;

    impl BackgroundRemover for WrongSize {
        fn remove_background(&self, _image: &RgbaImage) -> Result<RgbaImage, PassportError> {
            Ok(RgbaImage::new(1, 1))
        }
    }

    #[test]
    fn builder_invalid_input() {
        let result = PassportPhoto::new(b"not an image".to_vec());
        assert!(matches!(result, Err(PassportError::DecodeError(_))));
    }

    #[test]
    fn zero_dimensions_rejected() {
        let result = PassportPhoto::from_dynamic(DynamicImage::new_rgb8(0, 10));
        assert!(matches!(result, Err(PassportError::ZeroDimensions)));
    }

    #[test]
    fn prepared_image_renders_both_modes_with_one_segmentation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let photo = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .background_remover(Box::new(CountingRemover(Arc::clone(&calls))))
            .manual_points(Point::new(100.0, 30.0), Point::new(100.0, 255.0));
        let ts = DateTime::from_timestamp_millis(7).unwrap();

        let prepared = photo.prepare().unwrap();
        let final_out = photo.render(&prepared, RenderMode::Final, ts).unwrap();
        let preview = photo.render(&prepared, RenderMode::Preview, ts).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(final_out.analysis, *prepared.analysis());
        assert_eq!(preview.analysis.transform, final_out.analysis.transform);
        assert_eq!(final_out.file_name, preview.file_name);
    }

    #[test]
    fn render_refuses_inverted_geometry() {
        let photo = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .manual_points(Point::new(100.0, 250.0), Point::new(100.0, 40.0));
        let prepared = photo.prepare().unwrap();
        assert!(matches!(
            photo.render(&prepared, RenderMode::Final, Utc::now()),
            Err(PassportError::InvertedHeadPoints { .. })
        ));
    }

    #[test]
    fn no_detector_falls_back_to_unverified_guess() {
        let analysis = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .analyze()
            .unwrap();
        assert!(!analysis.is_verified());
        assert_eq!(analysis.geometry.source, PointSource::Heuristic);
        assert_eq!(analysis.scores.head_ratio, None);
        assert!(analysis.scores.exposure.is_some());
        assert!(analysis.transform.is_some());
    }

    #[test]
    fn detection_drives_geometry() {
        let analysis = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .face_detector(Box::new(PrecomputedDetector::new(Some(detection(
                200.0, 300.0,
            )))))
            .analyze()
            .unwrap();
        assert!(analysis.is_verified());
        assert_eq!(analysis.geometry.source, PointSource::Detected);
        assert_eq!(analysis.geometry.face_center_x, 100.0);
        assert!(analysis.scores.head_ok.is_some());
        assert!(analysis.detection.is_some());
    }

    #[test]
    fn manual_points_override_detection() {
        let analysis = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .face_detector(Box::new(PrecomputedDetector::new(Some(detection(
                200.0, 300.0,
            )))))
            .manual_points(Point::new(100.0, 30.0), Point::new(100.0, 255.0))
            .analyze()
            .unwrap();
        assert_eq!(analysis.geometry.source, PointSource::Manual);
        assert_eq!(analysis.scores.head_ratio, Some(0.75));
        assert_eq!(analysis.scores.head_ok, Some(true));
    }

    #[test]
    fn inverted_manual_points_refuse_to_compose() {
        let photo = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .manual_points(Point::new(100.0, 250.0), Point::new(100.0, 40.0));
        let analysis = photo.analyze().unwrap();
        assert_eq!(analysis.transform, None);
        assert!(matches!(
            photo.compose(RenderMode::Final),
            Err(PassportError::InvertedHeadPoints { .. })
        ));
    }

    #[test]
    fn degenerate_manual_points_refuse_to_compose() {
        let photo = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .manual_points(Point::new(100.0, 100.0), Point::new(100.0, 100.4));
        assert!(matches!(
            photo.compose(RenderMode::Preview),
            Err(PassportError::DegenerateHeadLength(_))
        ));
    }

    #[test]
    fn final_output_is_sized_and_stamped() {
        let ts = DateTime::from_timestamp_millis(1_234).unwrap();
        let output = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .manual_points(Point::new(100.0, 30.0), Point::new(100.0, 255.0))
            .compose_at(RenderMode::Final, ts)
            .unwrap();
        assert_eq!((output.width, output.height), (413, 531));
        assert_eq!(output.file_name, "passport_413x531_1234.jpg");
        assert_eq!(jfif::read_density(&output.data), Some((1, 300, 300)));
        let decoded = image::load_from_memory(&output.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (413, 531));
    }

    #[test]
    fn preview_keeps_encoder_density() {
        let output = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .manual_points(Point::new(100.0, 30.0), Point::new(100.0, 255.0))
            .target_dpi(600)
            .compose(RenderMode::Preview)
            .unwrap();
        assert_eq!(output.mode, RenderMode::Preview);
        assert_ne!(jfif::read_density(&output.data), Some((1, 600, 600)));
    }

    #[test]
    fn custom_dpi_is_written() {
        let output = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .manual_points(Point::new(100.0, 30.0), Point::new(100.0, 255.0))
            .target_dpi(600)
            .compose(RenderMode::Final)
            .unwrap();
        assert_eq!(jfif::read_density(&output.data), Some((1, 600, 600)));
    }

    #[test]
    fn background_remover_output_is_flattened_to_white() {
        let analysis = PassportPhoto::new(make_test_png(200, 300))
            .unwrap()
            .background_remover(Box::new(ClearEverything))
            .analyze()
            .unwrap();
        assert_eq!(analysis.region.bg_whiteness, 100);
        assert_eq!(analysis.region.bg_uniformity, 100);
    }

    #[test]
    fn background_remover_size_mismatch_is_error() {
        let result = PassportPhoto::new(make_test_png(20, 30))
            .unwrap()
            .background_remover(Box::new(WrongSize))
            .analyze();
        assert!(matches!(result, Err(PassportError::BackgroundRemoval(_))));
    }

    #[test]
    fn invalid_config_is_rejected_on_compose() {
        let config = PassportConfig {
            final_quality: 0,
            ..PassportConfig::default()
        };
        let result = PassportPhoto::new(make_test_png(20, 30))
            .unwrap()
            .config(config)
            .compose(RenderMode::Final);
        assert!(matches!(result, Err(PassportError::InvalidQuality(0))));
    }
}
