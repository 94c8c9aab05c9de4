//! Threshold checks and operator advice.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crown::{head_ratio, HeadGeometry};
use crate::region::RegionScores;

/// Pass/advice thresholds. Scores are on the 0–100 scale of [`RegionScores`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComplianceThresholds {
    /// Lowest acceptable head ratio (inclusive).
    pub head_ratio_min: f64,
    /// Highest acceptable head ratio (inclusive).
    pub head_ratio_max: f64,
    /// Background whiteness below this triggers advice.
    pub min_bg_whiteness: i32,
    /// Background uniformity below this triggers advice.
    pub min_bg_uniformity: i32,
    /// Exposure below this triggers advice.
    pub min_exposure: i32,
    /// Sharpness below this triggers advice.
    pub min_sharpness: i32,
}

impl Default for ComplianceThresholds {
    fn default() -> Self {
        Self {
            head_ratio_min: 0.711,
            head_ratio_max: 0.800,
            min_bg_whiteness: 80,
            min_bg_uniformity: 75,
            min_exposure: 70,
            min_sharpness: 35,
        }
    }
}

/// Compliance summary. Every field stays `None` until its input exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityScores {
    /// Crown-to-chin distance over image height.
    pub head_ratio: Option<f64>,
    /// Whether `head_ratio` is inside the accepted band.
    pub head_ok: Option<bool>,
    /// Background whiteness, 0–100.
    pub bg_whiteness: Option<i32>,
    /// Background uniformity, 0–100.
    pub bg_uniformity: Option<i32>,
    /// Exposure, nominally 0–100.
    pub exposure: Option<i32>,
    /// Sharpness, 0–100.
    pub sharpness: Option<i32>,
}

impl QualityScores {
    fn has_any(&self) -> bool {
        self.head_ratio.is_some()
            || self.bg_whiteness.is_some()
            || self.bg_uniformity.is_some()
            || self.exposure.is_some()
            || self.sharpness.is_some()
    }
}

/// One piece of operator-facing advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Advisory {
    /// Background is not white enough.
    BackgroundColor,
    /// Background lighting is uneven.
    BackgroundEvenness,
    /// Photo is too dark or too bright.
    Exposure,
    /// Photo is blurry.
    Sharpness,
    /// Head size is out of range; normalization will fix it.
    HeadSizeCorrected,
    /// Nothing to report.
    NoIssues,
}

impl Advisory {
    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            Advisory::BackgroundColor => "background-color",
            Advisory::BackgroundEvenness => "background-evenness",
            Advisory::Exposure => "exposure",
            Advisory::Sharpness => "sharpness",
            Advisory::HeadSizeCorrected => "head-size-corrected",
            Advisory::NoIssues => "no-issues",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Advisory::BackgroundColor => {
                "Background is not white enough; use a plain white wall or enable background removal."
            }
            Advisory::BackgroundEvenness => {
                "Background is unevenly lit; avoid shadows behind the subject."
            }
            Advisory::Exposure => "Exposure is off; retake the photo with even, brighter lighting.",
            Advisory::Sharpness => "Photo looks blurry; hold the camera steady and refocus.",
            Advisory::HeadSizeCorrected => {
                "Head size is outside the accepted range; normalization will correct it automatically."
            }
            Advisory::NoIssues => "No issues found.",
        };
        f.write_str(message)
    }
}

/// Whether `ratio` lies in the closed head-ratio interval.
pub fn head_ok(ratio: f64, thresholds: &ComplianceThresholds) -> bool {
    ratio >= thresholds.head_ratio_min && ratio <= thresholds.head_ratio_max
}

/// Assemble a [`QualityScores`] record from whatever inputs are available.
pub fn score(
    geometry: Option<&HeadGeometry>,
    image_height: u32,
    region: Option<&RegionScores>,
    thresholds: &ComplianceThresholds,
) -> QualityScores {
    let ratio = geometry.and_then(|g| head_ratio(g, image_height));
    QualityScores {
        head_ratio: ratio,
        head_ok: ratio.map(|r| head_ok(r, thresholds)),
        bg_whiteness: region.map(|r| r.bg_whiteness),
        bg_uniformity: region.map(|r| r.bg_uniformity),
        exposure: region.map(|r| r.exposure),
        sharpness: region.map(|r| r.sharpness),
    }
}

/// Advice for every crossed threshold, or [`Advisory::NoIssues`] when scores
/// exist and none is crossed. Empty when there is nothing to judge.
pub fn advisories(scores: &QualityScores, thresholds: &ComplianceThresholds) -> Vec<Advisory> {
    let below = |value: Option<i32>, min: i32| value.is_some_and(|v| v < min);

    let mut out = Vec::new();
    if below(scores.bg_whiteness, thresholds.min_bg_whiteness) {
        out.push(Advisory::BackgroundColor);
    }
    if below(scores.bg_uniformity, thresholds.min_bg_uniformity) {
        out.push(Advisory::BackgroundEvenness);
    }
    if below(scores.exposure, thresholds.min_exposure) {
        out.push(Advisory::Exposure);
    }
    if below(scores.sharpness, thresholds.min_sharpness) {
        out.push(Advisory::Sharpness);
    }
    if scores.head_ok == Some(false) {
        out.push(Advisory::HeadSizeCorrected);
    }
    if out.is_empty() && scores.has_any() {
        out.push(Advisory::NoIssues);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crown::manual_head;
    use crate::face_detector::Point;

    fn region(w: i32, u: i32, e: i32, s: i32) -> RegionScores {
        RegionScores {
            bg_whiteness: w,
            bg_uniformity: u,
            exposure: e,
            sharpness: s,
            background_samples: 100,
        }
    }

    #[test]
    fn head_ok_is_closed_interval() {
        let t = ComplianceThresholds::default();
        assert!(head_ok(0.711, &t));
        assert!(head_ok(0.800, &t));
        assert!(head_ok(0.75, &t));
        assert!(!head_ok(0.7109, &t));
        assert!(!head_ok(0.8001, &t));
    }

    #[test]
    fn head_ratio_reference_case() {
        let g = manual_head(Point::new(5.0, 100.0), Point::new(5.0, 400.0));
        let s = score(Some(&g), 400, None, &ComplianceThresholds::default());
        assert_eq!(s.head_ratio, Some(0.75));
        assert_eq!(s.head_ok, Some(true));
        assert_eq!(s.bg_whiteness, None);
    }

    #[test]
    fn missing_inputs_leave_fields_empty() {
        let s = score(None, 400, None, &ComplianceThresholds::default());
        assert_eq!(s, QualityScores::default());
        assert!(advisories(&s, &ComplianceThresholds::default()).is_empty());
    }

    #[test]
    fn each_threshold_emits_its_advisory() {
        let t = ComplianceThresholds::default();
        let s = score(None, 0, Some(&region(79, 74, 69, 34)), &t);
        assert_eq!(
            advisories(&s, &t),
            vec![
                Advisory::BackgroundColor,
                Advisory::BackgroundEvenness,
                Advisory::Exposure,
                Advisory::Sharpness,
            ]
        );
    }

    #[test]
    fn thresholds_are_strict() {
        let t = ComplianceThresholds::default();
        let s = score(None, 0, Some(&region(80, 75, 70, 35)), &t);
        assert_eq!(advisories(&s, &t), vec![Advisory::NoIssues]);
    }

    #[test]
    fn negative_exposure_triggers_advice() {
        let t = ComplianceThresholds::default();
        let s = score(None, 0, Some(&region(95, 95, -20, 80)), &t);
        assert_eq!(advisories(&s, &t), vec![Advisory::Exposure]);
    }

    #[test]
    fn bad_head_ratio_notes_auto_correction() {
        let t = ComplianceThresholds::default();
        let g = manual_head(Point::new(0.0, 0.0), Point::new(0.0, 100.0));
        let s = score(Some(&g), 400, Some(&region(95, 95, 90, 80)), &t);
        assert_eq!(s.head_ok, Some(false));
        assert_eq!(advisories(&s, &t), vec![Advisory::HeadSizeCorrected]);
    }

    #[test]
    fn custom_thresholds_change_verdicts() {
        let t = ComplianceThresholds {
            min_sharpness: 90,
            ..ComplianceThresholds::default()
        };
        let s = score(None, 0, Some(&region(95, 95, 90, 80)), &t);
        assert_eq!(advisories(&s, &t), vec![Advisory::Sharpness]);
    }

    #[test]
    fn advisory_codes_and_messages() {
        assert_eq!(Advisory::NoIssues.code(), "no-issues");
        assert_eq!(Advisory::NoIssues.to_string(), "No issues found.");
        assert!(Advisory::HeadSizeCorrected
            .to_string()
            .contains("automatically"));
        let json = serde_json::to_string(&Advisory::BackgroundEvenness).unwrap();
        assert_eq!(json, "\"background-evenness\"");
    }
}
