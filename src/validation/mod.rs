//! Boundary validation for soil requests
//! Rejects missing, non-numeric and out-of-range input before any prediction

pub mod types;
pub mod validator;

pub use types::{FieldRange, FIELD_RANGES, TEXTURE_SUM_EPSILON, TEXTURE_SUM_MAX, TEXTURE_SUM_MIN};
pub use validator::{validate_input, validate_request};
