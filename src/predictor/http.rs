//! Remote predictor HTTP client
//!
//! Talks to the ML model server:
//! - POST /predict     (one attempt, bounded timeout)
//! - GET  /health
//! - GET  /model/info

use crate::config::PredictorConfig;
use crate::engine::rules::{
    round_one_decimal, CONFIDENCE_MAX, CONFIDENCE_MIN, RATE_MAX, RATE_MIN, YIELD_MAX, YIELD_MIN,
};
use crate::engine::{IdGenerator, UuidGenerator};
use crate::errors::{Result, SoilSyncError};
use crate::predictor::labels::normalize_fertilizer_label;
use crate::types::{Recommendation, SoilInput};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Version tag used when the remote omits `model_version`
pub const DEFAULT_REMOTE_MODEL_VERSION: &str = "remote-v1.0.0";

/// Anything that can produce a recommendation remotely
#[async_trait]
pub trait RemotePredictor: Send + Sync {
    /// Single prediction attempt; any error triggers the fallback engine
    async fn predict(&self, input: &SoilInput) -> Result<Recommendation>;
}

/// Remote model server client
#[derive(Clone)]
pub struct HttpPredictor {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    ids: Arc<dyn IdGenerator>,
}

/// Request body for POST /predict
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    #[serde(flatten)]
    soil: &'a SoilInput,
    features: [f64; 10],
}

/// Server health as reported by GET /health
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub model_version: Option<String>,
}

/// Model metadata from GET /model/info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteModelInfo {
    pub model_loaded: bool,
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub fertilizer_options: Vec<String>,
}

impl HttpPredictor {
    /// Create a client from explicit configuration
    pub fn new(config: &PredictorConfig) -> Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SoilSyncError::HttpError)?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            timeout,
            ids: Arc::new(UuidGenerator),
        })
    }

    /// Replace the id generator used when the remote sends no id
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Check whether the model server is up with a model loaded
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        let response = match self.authorized(self.client.get(&url)).send().await {
            Ok(response) => response,
            Err(_) => return Ok(false),
        };

        if !response.status().is_success() {
            return Ok(false);
        }

        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| SoilSyncError::MalformedResponse(format!("health: {}", e)))?;

        Ok(health.status == "healthy" && health.model_loaded)
    }

    /// Fetch model metadata
    pub async fn model_info(&self) -> Result<RemoteModelInfo> {
        let url = format!("{}/model/info", self.base_url);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|e| SoilSyncError::RemoteUnavailable(format!("Failed to reach model server: {}", e)))?;

        if !response.status().is_success() {
            return Err(SoilSyncError::RemoteUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SoilSyncError::MalformedResponse(format!("model info: {}", e)))
    }

    async fn send_predict(&self, input: &SoilInput) -> Result<Recommendation> {
        let url = format!("{}/predict", self.base_url);
        let body = PredictRequest {
            soil: input,
            features: input.features(),
        };

        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SoilSyncError::RemoteUnavailable(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SoilSyncError::RemoteUnavailable(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SoilSyncError::RemoteUnavailable(format!("Failed to read response: {}", e)))?;

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| SoilSyncError::MalformedResponse(format!("invalid JSON: {}", e)))?;

        parse_remote_response(&value, self.ids.as_ref())
    }
}

#[async_trait]
impl RemotePredictor for HttpPredictor {
    async fn predict(&self, input: &SoilInput) -> Result<Recommendation> {
        match tokio::time::timeout(self.timeout, self.send_predict(input)).await {
            Ok(result) => result,
            Err(_) => Err(SoilSyncError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

impl std::fmt::Debug for HttpPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPredictor")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Turn a remote JSON body into a recommendation
///
/// Every output field must be present and numeric; remote numbers go
/// through the same clamps as the local engine.
pub fn parse_remote_response(value: &Value, ids: &dyn IdGenerator) -> Result<Recommendation> {
    let object = value
        .as_object()
        .ok_or_else(|| SoilSyncError::MalformedResponse("response is not an object".to_string()))?;

    let fertilizer = object
        .get("fertilizer")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SoilSyncError::MalformedResponse("missing field: fertilizer".to_string()))?;

    let rate = required_number(object, &["application_rate"])?;
    let confidence = required_number(object, &["confidence_score", "confidence"])?;
    let yield_increase = required_number(object, &["expected_yield_increase"])?;

    let model_version = object
        .get("model_version")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REMOTE_MODEL_VERSION)
        .to_string();

    let prediction_id = object
        .get("prediction_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| ids.generate());

    Ok(Recommendation {
        fertilizer: normalize_fertilizer_label(fertilizer),
        application_rate: rate.clamp(RATE_MIN, RATE_MAX).round() as u32,
        confidence_score: round_one_decimal(confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)),
        expected_yield_increase: yield_increase.clamp(YIELD_MIN, YIELD_MAX).round() as u32,
        model_version,
        prediction_id,
    })
}

fn required_number(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Result<f64> {
    let found = keys.iter().find_map(|key| object.get(*key).filter(|v| !v.is_null()));

    match found {
        None => Err(SoilSyncError::MalformedResponse(format!(
            "missing field: {}",
            keys[0]
        ))),
        Some(v) => v
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| SoilSyncError::MalformedResponse(format!(
                "field {} is not numeric: {}",
                keys[0], v
            ))),
    }
}
