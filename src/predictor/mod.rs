//! Remote predictor with local fallback
//! 
//! Provides the HTTP model client, the fallback-aware coordinator and the
//! per-call phase state machine.

pub mod client;
pub mod http;
pub mod labels;
pub mod phase;

// Re-export commonly used types
pub use client::PredictorClient;
pub use http::{HttpPredictor, RemoteModelInfo, RemotePredictor, DEFAULT_REMOTE_MODEL_VERSION};
pub use phase::{PhaseEvent, PredictionPhase};
