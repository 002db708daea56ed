pub mod visualization;

use serde::Serialize;

use crate::{ComparisonReport, ImageProperties, Region, detection::ConfidenceLevel};

/// Serializable summary of a full comparison. The leading fields match the
/// `{manipulated, score, message}` shape callers return over the wire.
#[derive(Serialize)]
pub struct JsonReport {
    pub manipulated: bool,
    pub score: f64,
    pub message: String,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    pub difference_dimensions: (u32, u32),
    pub changed_regions: Vec<Region>,
    pub original: ImageProperties,
    pub suspect: ImageProperties,
}

impl From<&ComparisonReport> for JsonReport {
    fn from(report: &ComparisonReport) -> Self {
        Self {
            manipulated: report.similarity.manipulated,
            score: report.similarity.score,
            message: report.similarity.message.clone(),
            confidence: report.similarity.confidence,
            confidence_level: report.similarity.confidence_level,
            difference_dimensions: report.difference.dimensions(),
            changed_regions: report.changed_regions.clone(),
            original: report.original.clone(),
            suspect: report.suspect.clone(),
        }
    }
}

impl JsonReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
