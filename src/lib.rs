//! SoilSync - Fertilizer Recommendation Engine
//!
//! Recommends a fertilizer, application rate, confidence score and expected
//! yield increase from soil chemistry, texture and environment.
//!
//! # Architecture
//!
//! - **Engine**: deterministic rule chain with injected variance and ids
//! - **Predictor**: single-attempt remote model call with local fallback
//! - **Validation**: boundary checks before any prediction
//! - **Audit**: fire-and-forget logging to a persistence collaborator

pub mod errors;
pub mod types;
pub mod validation;
pub mod engine;
pub mod predictor;
pub mod audit;

// Re-export commonly used types
pub use errors::{Result, SoilSyncError, ValidationError};
pub use types::{Crop, PredictionOutcome, PredictionSource, Recommendation, SoilInput};
pub use engine::RecommendationEngine;
pub use predictor::PredictorClient;

// Configuration, logging and command line
pub mod config;
pub mod logging;
pub mod cli;
