//! Audit sink implementations

use crate::audit::{AuditRecord, AuditSink};
use crate::config::AuditConfig;
use crate::errors::{Result, SoilSyncError};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Discards every record
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _record: AuditRecord) -> Result<()> {
        Ok(())
    }
}

/// Emits each record as a structured log event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        tracing::info!(
            target: "soilsync::audit",
            prediction_id = %record.prediction_id,
            crop = %record.input.crop_type,
            fertilizer = %record.output.fertilizer,
            rate = record.output.application_rate,
            model_version = %record.output.model_version,
            success = record.success,
            error = record.error.as_deref().unwrap_or(""),
            "prediction recorded"
        );
        Ok(())
    }
}

/// Appends one JSON line per record
#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Inserts records into a REST table endpoint
///
/// Speaks the PostgREST dialect: `POST {url}/rest/v1/{table}` with `apikey`
/// and bearer headers.
#[derive(Debug, Clone)]
pub struct RestAuditSink {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RestAuditSink {
    pub fn new(base_url: &str, table: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(SoilSyncError::HttpError)?;

        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key,
        })
    }

    pub fn from_config(config: &AuditConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| SoilSyncError::ConfigError("audit.url is required for the rest sink".to_string()))?;
        Self::new(url, &config.table, config.api_key.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AuditSink for RestAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "return=minimal")
            .json(&record);

        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SoilSyncError::Audit(format!("Failed to reach audit store: {}", e)))?;

        if !response.status().is_success() {
            return Err(SoilSyncError::Audit(format!(
                "audit store returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Audit counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditStats {
    pub records: usize,
    pub remote_successes: usize,
    pub fallbacks: usize,
}

/// In-memory sink with success/fallback counters
#[derive(Clone, Default)]
pub struct MemoryAuditSink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
    stats: Arc<Mutex<AuditStats>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> AuditStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Share of predictions the remote answered; 1.0 when nothing recorded
    pub fn remote_success_rate(&self) -> f64 {
        let stats = self.stats();
        if stats.records == 0 {
            1.0
        } else {
            stats.remote_successes as f64 / stats.records as f64
        }
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: AuditRecord) -> Result<()> {
        {
            let mut stats = self
                .stats
                .lock()
                .map_err(|e| SoilSyncError::Audit(format!("stats lock poisoned: {}", e)))?;
            stats.records += 1;
            if record.success {
                stats.remote_successes += 1;
            } else {
                stats.fallbacks += 1;
            }
        }

        self.records
            .lock()
            .map_err(|e| SoilSyncError::Audit(format!("records lock poisoned: {}", e)))?
            .push(record);
        Ok(())
    }
}
