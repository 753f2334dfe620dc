//! Local recommendation engine
//!
//! Pure rule chain plus two injected dependencies: a variance source and an
//! identifier generator. With both fixed the engine is fully deterministic.

pub mod ids;
pub mod rules;
pub mod variance;

pub use ids::{FixedId, IdGenerator, UuidGenerator};
pub use rules::{assess, select_base_rule, Assessment, BaseRule};
pub use variance::{FixedVariance, SeededVariance, ThreadRngVariance, Variance, VarianceSource};

use crate::types::{Recommendation, SoilInput};
use std::sync::Arc;

/// Version tag carried by every locally computed recommendation
pub const FALLBACK_MODEL_VERSION: &str = "fallback-enhanced-v2.0.0";

/// Rule-based fertilizer recommender
#[derive(Clone)]
pub struct RecommendationEngine {
    variance: Arc<dyn VarianceSource>,
    ids: Arc<dyn IdGenerator>,
}

impl RecommendationEngine {
    /// Create an engine with explicit randomness and id sources
    pub fn new(variance: Arc<dyn VarianceSource>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { variance, ids }
    }

    /// Zero variance and a constant id, for reproducible output
    pub fn deterministic(id: impl Into<String>) -> Self {
        Self::new(Arc::new(FixedVariance::none()), Arc::new(FixedId::new(id)))
    }

    /// Seeded variance with random ids
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededVariance::new(seed)), Arc::new(UuidGenerator))
    }

    /// Compute a recommendation for validated input
    ///
    /// Total over the validated domain; never fails.
    pub fn recommend(&self, input: &SoilInput) -> Recommendation {
        let assessment = assess(input, self.variance.draw());

        tracing::debug!(
            base_rule = ?assessment.base_rule,
            crop = %input.crop(),
            raw_rate = assessment.rate,
            raw_confidence = assessment.confidence,
            "fallback engine assessed input"
        );

        Recommendation {
            application_rate: assessment.clamped_rate(),
            confidence_score: assessment.clamped_confidence(),
            expected_yield_increase: assessment.clamped_yield(),
            fertilizer: assessment.fertilizer,
            model_version: FALLBACK_MODEL_VERSION.to_string(),
            prediction_id: self.ids.generate(),
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngVariance), Arc::new(UuidGenerator))
    }
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine").finish_non_exhaustive()
    }
}
