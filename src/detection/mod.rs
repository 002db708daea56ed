use serde::{Deserialize, Serialize};

use crate::{
    SimilarityResult,
    error::{ForensicsError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 0.2 => ConfidenceLevel::None,
            s if s < 0.4 => ConfidenceLevel::Low,
            s if s < 0.6 => ConfidenceLevel::Medium,
            s if s < 0.8 => ConfidenceLevel::High,
            _ => ConfidenceLevel::VeryHigh,
        }
    }
}

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(ForensicsError::InvalidInput(format!(
            "Threshold must be between 0 and 1, got {}",
            threshold
        )));
    }

    Ok(())
}

/// Turns a similarity score into a manipulation verdict.
#[derive(Debug, Clone, Copy)]
pub struct ManipulationDecision {
    threshold: f64,
}

impl ManipulationDecision {
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn decide(&self, score: f64) -> SimilarityResult {
        let manipulated = score < self.threshold;

        let (confidence, message) = if manipulated {
            let confidence = (self.threshold - score) / self.threshold * 100.0;
            (confidence, format!("Manipulation detected (confidence: {:.1}%)", confidence))
        } else {
            let confidence = score * 100.0;
            (confidence, format!("No manipulation detected (similarity: {:.1}%)", confidence))
        };

        log::info!("Detection result: manipulated={}, score={:.4}", manipulated, score);

        SimilarityResult {
            score,
            manipulated,
            message,
            confidence,
            confidence_level: ConfidenceLevel::from_score(confidence / 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_is_manipulated() {
        let decision = ManipulationDecision::new(0.98).unwrap();

        let result = decision.decide(0.49);

        assert!(result.manipulated);
        assert!((result.confidence - 50.0).abs() < 1e-9);
        assert_eq!(result.message, "Manipulation detected (confidence: 50.0%)");
        assert_eq!(result.confidence_level, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_at_threshold_is_clean() {
        let decision = ManipulationDecision::new(0.98).unwrap();

        let result = decision.decide(0.98);

        assert!(!result.manipulated);
        assert_eq!(result.message, "No manipulation detected (similarity: 98.0%)");
        assert_eq!(result.confidence_level, ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn test_zero_threshold_never_flags() {
        let decision = ManipulationDecision::new(0.0).unwrap();

        assert!(!decision.decide(0.0).manipulated);
    }

    #[test]
    fn test_threshold_bounds() {
        assert!(ManipulationDecision::new(1.0).is_ok());
        assert!(ManipulationDecision::new(-0.01).unwrap_err().is_invalid_input());
        assert!(ManipulationDecision::new(1.5).unwrap_err().is_invalid_input());
        assert!(ManipulationDecision::new(f64::NAN).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_rejected_threshold_reports_value() {
        let err = ManipulationDecision::new(1.5).unwrap_err();

        assert_eq!(err.to_string(), "Invalid input: Threshold must be between 0 and 1, got 1.5");
        assert_eq!(ManipulationDecision::new(0.5).unwrap().threshold(), 0.5);
    }
}
