//! Predictor client with local fallback
//!
//! Flow per call:
//! 1. Call the remote predictor once, bounded by the configured timeout
//! 2. On any failure run the local recommendation engine instead
//! 3. Dispatch an audit record without waiting for it
//!
//! The caller only ever sees a `Recommendation`; which path produced it is
//! visible through `model_version`.

use crate::audit::{self, AuditRecord, AuditSink, TracingAuditSink};
use crate::config::{Config, PredictorConfig};
use crate::engine::{FixedVariance, RecommendationEngine, UuidGenerator};
use crate::errors::{Result, SoilSyncError, ValidationError};
use crate::predictor::http::{HttpPredictor, RemotePredictor};
use crate::predictor::phase::{PhaseEvent, PredictionPhase};
use crate::types::{PredictionOutcome, Recommendation, SoilInput};
use crate::validation::validate_request;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Remote-first predictor with deterministic fallback
#[derive(Clone)]
pub struct PredictorClient {
    remote: Option<Arc<dyn RemotePredictor>>,
    engine: RecommendationEngine,
    audit: Arc<dyn AuditSink>,
    timeout: Duration,
}

impl PredictorClient {
    /// Create a client from an explicit predictor configuration
    ///
    /// Uses the default engine (random variance, UUID ids) and logs audit
    /// records through `tracing`.
    pub fn new(config: &PredictorConfig) -> Result<Self> {
        config.validate()?;

        let remote: Option<Arc<dyn RemotePredictor>> = if config.enabled {
            Some(Arc::new(HttpPredictor::new(config)?))
        } else {
            None
        };

        Ok(Self {
            remote,
            engine: RecommendationEngine::default(),
            audit: Arc::new(TracingAuditSink),
            timeout: config.timeout(),
        })
    }

    /// Build the full client described by a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = if config.engine.deterministic {
            RecommendationEngine::new(Arc::new(FixedVariance::none()), Arc::new(UuidGenerator))
        } else if let Some(seed) = config.engine.seed {
            RecommendationEngine::seeded(seed)
        } else {
            RecommendationEngine::default()
        };

        Ok(Self::new(&config.predictor)?
            .with_engine(engine)
            .with_audit(audit::sink_from_config(config)?))
    }

    /// Assemble a client from parts; `remote = None` always falls back
    pub fn with_parts(
        remote: Option<Arc<dyn RemotePredictor>>,
        engine: RecommendationEngine,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            remote,
            engine,
            audit,
            timeout: PredictorConfig::default().timeout(),
        }
    }

    pub fn with_engine(mut self, engine: RecommendationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Upper bound on the remote call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn engine(&self) -> &RecommendationEngine {
        &self.engine
    }

    /// Recommendation for validated input; never fails
    pub async fn recommend(&self, input: &SoilInput) -> Recommendation {
        self.predict(input).await.recommendation
    }

    /// Validate a raw request body, then predict
    ///
    /// Validation errors are returned before any remote call is made.
    pub async fn recommend_json(
        &self,
        body: &serde_json::Value,
    ) -> std::result::Result<Recommendation, ValidationError> {
        let input = validate_request(body)?;
        Ok(self.recommend(&input).await)
    }

    /// Recommendation plus the path that produced it
    pub async fn predict(&self, input: &SoilInput) -> PredictionOutcome {
        self.predict_tracked(input).await.0
    }

    /// Like `predict`, also returning the spawned audit write
    ///
    /// One-shot callers can pass the handle to `audit::flush` before exit.
    pub async fn predict_tracked(&self, input: &SoilInput) -> (PredictionOutcome, Option<JoinHandle<()>>) {
        let mut phase = PredictionPhase::Idle;
        advance(&mut phase, PhaseEvent::Start);

        let outcome = match self.call_remote(input).await {
            Ok(recommendation) => {
                advance(&mut phase, PhaseEvent::RemoteSucceeded);
                tracing::info!(
                    prediction_id = %recommendation.prediction_id,
                    model_version = %recommendation.model_version,
                    "remote prediction succeeded"
                );
                PredictionOutcome::remote(recommendation)
            }
            Err(e) => {
                advance(&mut phase, PhaseEvent::RemoteFailed);
                if self.remote.is_some() {
                    tracing::warn!(error = %e, "remote prediction failed, using fallback engine");
                } else {
                    tracing::debug!("remote predictor disabled, using fallback engine");
                }
                let recommendation = self.engine.recommend(input);
                advance(&mut phase, PhaseEvent::FallbackComplete);
                PredictionOutcome::fallback(recommendation, e.to_string())
            }
        };

        debug_assert!(phase.is_terminal());

        let pending = audit::dispatch(self.audit.clone(), AuditRecord::from_outcome(input, &outcome));
        (outcome, pending)
    }

    async fn call_remote(&self, input: &SoilInput) -> Result<Recommendation> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| SoilSyncError::RemoteUnavailable("remote predictor disabled".to_string()))?;

        match tokio::time::timeout(self.timeout, remote.predict(input)).await {
            Ok(result) => result,
            Err(_) => Err(SoilSyncError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

fn advance(phase: &mut PredictionPhase, event: PhaseEvent) {
    match phase.transition(event) {
        Ok(next) => *phase = next,
        Err(e) => tracing::error!(error = %e, "prediction phase out of order"),
    }
}

impl std::fmt::Debug for PredictorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictorClient")
            .field("has_remote", &self.remote.is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
