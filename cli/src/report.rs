//! JSON report written by `--report`.

use std::path::Path;

use passport_photo::{Analysis, QualityScores};
use serde::Serialize;

/// One advisory as `{code, message}`.
#[derive(Debug, Serialize)]
pub struct AdviceRecord {
    pub code: &'static str,
    pub message: String,
}

/// Everything the CLI learned and wrote for one input.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    pub verified: bool,
    pub scores: QualityScores,
    pub advice: Vec<AdviceRecord>,
    pub analysis: &'a Analysis,
}

impl<'a> Report<'a> {
    pub fn new(input: &Path, output: &Path, preview: Option<&Path>, analysis: &'a Analysis) -> Self {
        Self {
            input: input.display().to_string(),
            output: output.display().to_string(),
            preview: preview.map(|p| p.display().to_string()),
            verified: analysis.is_verified(),
            scores: analysis.scores,
            advice: analysis
                .advisories
                .iter()
                .map(|a| AdviceRecord {
                    code: a.code(),
                    message: a.to_string(),
                })
                .collect(),
            analysis,
        }
    }
}
