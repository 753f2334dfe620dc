//! Prediction identifier generation

use uuid::Uuid;

/// Produces a fresh identifier per prediction
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Returns the same identifier every time
#[derive(Debug, Clone)]
pub struct FixedId(pub String);

impl FixedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl IdGenerator for FixedId {
    fn generate(&self) -> String {
        self.0.clone()
    }
}
