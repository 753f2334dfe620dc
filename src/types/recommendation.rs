//! Recommendation output types

use serde::{Deserialize, Serialize};

/// Fertilizer recommendation for one request
///
/// Produced once per call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Formulation name, possibly with an application-method annotation
    pub fertilizer: String,

    /// kg/ha, within [50, 300]
    pub application_rate: u32,

    /// Percent with one decimal, within [70, 98]
    pub confidence_score: f64,

    /// Percent, within [5, 35]
    pub expected_yield_increase: u32,

    /// Which path produced the result
    pub model_version: String,

    pub prediction_id: String,
}

/// Where a recommendation came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum PredictionSource {
    /// Remote model answered with a complete response
    Remote,

    /// Local engine ran because the remote call failed
    Fallback { reason: String },
}

impl PredictionSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, PredictionSource::Remote)
    }
}

/// Recommendation plus its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub recommendation: Recommendation,
    pub source: PredictionSource,
}

impl PredictionOutcome {
    pub fn remote(recommendation: Recommendation) -> Self {
        Self {
            recommendation,
            source: PredictionSource::Remote,
        }
    }

    pub fn fallback(recommendation: Recommendation, reason: impl Into<String>) -> Self {
        Self {
            recommendation,
            source: PredictionSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    /// Failure reason when the fallback path ran
    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.source {
            PredictionSource::Remote => None,
            PredictionSource::Fallback { reason } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recommendation {
        Recommendation {
            fertilizer: "Urea".to_string(),
            application_rate: 120,
            confidence_score: 94.0,
            expected_yield_increase: 25,
            model_version: "fallback-enhanced-v2.0.0".to_string(),
            prediction_id: "pred-1".to_string(),
        }
    }

    #[test]
    fn test_outcome_constructors() {
        let remote = PredictionOutcome::remote(sample());
        assert!(remote.source.is_remote());
        assert!(remote.fallback_reason().is_none());

        let fallback = PredictionOutcome::fallback(sample(), "timeout");
        assert!(!fallback.source.is_remote());
        assert_eq!(fallback.fallback_reason(), Some("timeout"));
    }

    #[test]
    fn test_source_serialization_is_tagged() {
        let json = serde_json::to_value(PredictionSource::Fallback {
            reason: "HTTP 500".to_string(),
        })
        .unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["reason"], "HTTP 500");
    }
}
