//! Audit logging of predictions
//!
//! Every prediction produces one `AuditRecord` handed to an `AuditSink`.
//! Dispatch is fire-and-forget: the record is written on a spawned task and
//! failures are logged, never returned to the caller.

pub mod sinks;

pub use sinks::{JsonlAuditSink, MemoryAuditSink, NoopAuditSink, RestAuditSink, TracingAuditSink};

use crate::config::{AuditSinkKind, Config};
use crate::errors::Result;
use crate::types::{PredictionOutcome, Recommendation, SoilInput};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// One (input, output, success, error?) tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub prediction_id: String,
    pub input: SoilInput,
    pub output: Recommendation,
    /// True when the remote predictor produced the output
    pub success: bool,
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_outcome(input: &SoilInput, outcome: &PredictionOutcome) -> Self {
        Self {
            prediction_id: outcome.recommendation.prediction_id.clone(),
            input: input.clone(),
            output: outcome.recommendation.clone(),
            success: outcome.source.is_remote(),
            error: outcome.fallback_reason().map(str::to_string),
            recorded_at: Utc::now(),
        }
    }
}

/// Persistence collaborator
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: AuditRecord) -> Result<()>;
}

/// Hand a record to the sink without waiting for it
///
/// Returns the spawned task so short-lived callers can let it finish before
/// shutting down. Outside a Tokio runtime the record is dropped with a
/// warning and `None` is returned.
pub fn dispatch(sink: Arc<dyn AuditSink>, record: AuditRecord) -> Option<JoinHandle<()>> {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            tracing::warn!(prediction_id = %record.prediction_id, "no async runtime; audit record dropped");
            return None;
        }
    };

    Some(handle.spawn(async move {
        let prediction_id = record.prediction_id.clone();
        if let Err(e) = sink.record(record).await {
            tracing::warn!(%prediction_id, error = %e, "audit logging failed");
        }
    }))
}

/// Wait up to `limit` for a dispatched audit write
pub async fn flush(pending: Option<JoinHandle<()>>, limit: Duration) {
    let Some(task) = pending else {
        return;
    };

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "audit task aborted"),
        Err(_) => tracing::warn!(limit_ms = limit.as_millis() as u64, "audit write still pending at exit"),
    }
}

/// Build the sink named in the configuration
pub fn sink_from_config(config: &Config) -> Result<Arc<dyn AuditSink>> {
    let sink: Arc<dyn AuditSink> = match config.audit.sink {
        AuditSinkKind::None => Arc::new(NoopAuditSink),
        AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
        AuditSinkKind::Jsonl => Arc::new(JsonlAuditSink::new(config.audit_path())),
        AuditSinkKind::Rest => Arc::new(RestAuditSink::from_config(&config.audit)?),
    };
    Ok(sink)
}
