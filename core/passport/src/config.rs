//! Tunable parameters shared by the CLI and the bindings.
//!
//! All fields have defaults matching the standard 35×45 mm passport frame at
//! 300 DPI, so an empty JSON object deserializes to a usable configuration.

use serde::{Deserialize, Serialize};

use crate::compliance::ComplianceThresholds;
use crate::error::PassportError;
use crate::normalize::CanvasSpec;

/// Which artifact [`crate::PassportPhoto::compose`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Deliverable JPEG at `final_quality`.
    #[default]
    Final,
    /// On-screen JPEG at `preview_quality` with crown/chin guide lines.
    Preview,
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PassportConfig {
    /// Output frame geometry.
    pub canvas: CanvasSpec,
    /// Compliance thresholds.
    pub thresholds: ComplianceThresholds,
    /// JPEG quality (1–100) for the final export.
    pub final_quality: u8,
    /// JPEG quality (1–100) for previews.
    pub preview_quality: u8,
    /// Resolution written into the JFIF header.
    pub target_dpi: u16,
}

impl Default for PassportConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSpec::default(),
            thresholds: ComplianceThresholds::default(),
            final_quality: 95,
            preview_quality: 70,
            target_dpi: 300,
        }
    }
}

impl PassportConfig {
    /// JPEG quality used for `mode`.
    pub fn quality_for(&self, mode: RenderMode) -> u8 {
        match mode {
            RenderMode::Final => self.final_quality,
            RenderMode::Preview => self.preview_quality,
        }
    }

    /// Check that the configuration describes a drawable frame.
    pub fn validate(&self) -> Result<(), PassportError> {
        let canvas = &self.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(PassportError::InvalidConfig(
                "canvas dimensions must be > 0".into(),
            ));
        }
        if canvas.head_height_px == 0 {
            return Err(PassportError::InvalidConfig(
                "head height must be > 0".into(),
            ));
        }
        if canvas.chin_line_px() > canvas.height {
            return Err(PassportError::InvalidConfig(format!(
                "chin line at {}px falls outside a {}px canvas",
                canvas.chin_line_px(),
                canvas.height
            )));
        }
        for quality in [self.final_quality, self.preview_quality] {
            if !(1..=100).contains(&quality) {
                return Err(PassportError::InvalidQuality(quality));
            }
        }
        if self.target_dpi == 0 {
            return Err(PassportError::InvalidConfig("target DPI must be > 0".into()));
        }
        let t = &self.thresholds;
        if t.head_ratio_min.is_nan() || t.head_ratio_max.is_nan() || t.head_ratio_min > t.head_ratio_max {
            return Err(PassportError::InvalidConfig(format!(
                "head ratio interval [{}, {}] is empty",
                t.head_ratio_min, t.head_ratio_max
            )));
        }
        Ok(())
    }
}
