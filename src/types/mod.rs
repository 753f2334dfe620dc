//! Type definitions module
//! 
//! Core value types flowing through the recommendation pipeline.

pub mod soil;
pub mod recommendation;

// Re-export commonly used types
pub use soil::{Crop, SoilInput, FEATURE_ORDER};
pub use recommendation::{PredictionOutcome, PredictionSource, Recommendation};
