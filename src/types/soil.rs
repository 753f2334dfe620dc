//! Soil and environment input types
//!
//! A `SoilInput` is built once per request, validated at the boundary and
//! consumed by either the remote predictor or the local engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature names in the order the remote model expects them
pub const FEATURE_ORDER: [&str; 10] = [
    "phosphorus",
    "potassium",
    "nitrogen",
    "organic_carbon",
    "cation_exchange",
    "sand_percent",
    "silt_percent",
    "clay_percent",
    "rainfall",
    "elevation",
];

/// Soil chemistry, texture and environment for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilInput {
    /// Available phosphorus (ppm)
    pub phosphorus: f64,
    /// Exchangeable potassium (ppm)
    pub potassium: f64,
    /// Total nitrogen (%)
    pub nitrogen: f64,
    /// Organic carbon (%)
    pub organic_carbon: f64,
    /// Cation exchange capacity (cmol/kg)
    pub cation_exchange: f64,
    pub sand_percent: f64,
    pub clay_percent: f64,
    pub silt_percent: f64,
    /// Mean annual precipitation (mm/yr)
    pub rainfall: f64,
    /// Elevation (m)
    pub elevation: f64,
    pub crop_type: String,
}

impl SoilInput {
    /// Parsed crop, case-insensitive
    pub fn crop(&self) -> Crop {
        Crop::parse(&self.crop_type)
    }

    /// Sand + clay + silt
    pub fn texture_sum(&self) -> f64 {
        self.sand_percent + self.clay_percent + self.silt_percent
    }

    /// Numeric features laid out according to `FEATURE_ORDER`
    pub fn features(&self) -> [f64; 10] {
        [
            self.phosphorus,
            self.potassium,
            self.nitrogen,
            self.organic_carbon,
            self.cation_exchange,
            self.sand_percent,
            self.silt_percent,
            self.clay_percent,
            self.rainfall,
            self.elevation,
        ]
    }

    /// Check ranges and texture balance, see `validation::validate_input`
    pub fn validate(&self) -> std::result::Result<(), crate::errors::ValidationError> {
        crate::validation::validate_input(self)
    }
}

/// Crops with dedicated override rules
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Crop {
    Maize,
    Rice,
    Beans,
    Potato,
    Cassava,
    Banana,
    /// Any other crop; no override is applied
    Other(String),
}

impl Crop {
    /// Parse a crop name (trimmed, lowercased)
    pub fn parse(name: &str) -> Self {
        let normalized = name.trim().to_lowercase();
        match normalized.as_str() {
            "maize" => Crop::Maize,
            "rice" => Crop::Rice,
            "beans" => Crop::Beans,
            "potato" => Crop::Potato,
            "cassava" => Crop::Cassava,
            "banana" => Crop::Banana,
            _ => Crop::Other(normalized),
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &str {
        match self {
            Crop::Maize => "maize",
            Crop::Rice => "rice",
            Crop::Beans => "beans",
            Crop::Potato => "potato",
            Crop::Cassava => "cassava",
            Crop::Banana => "banana",
            Crop::Other(name) => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Crop::Other(_))
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
