//! Accepted ranges for soil input fields

/// Inclusive numeric bounds for one input field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    const fn new(field: &'static str, min: f64, max: f64) -> Self {
        Self { field, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Bounds for every numeric field, in request order
///
/// Organic carbon, CEC, rainfall and elevation carry physical sanity bounds.
pub const FIELD_RANGES: [FieldRange; 10] = [
    FieldRange::new("phosphorus", 0.0, 200.0),
    FieldRange::new("potassium", 0.0, 1000.0),
    FieldRange::new("nitrogen", 0.0, 2.0),
    FieldRange::new("organic_carbon", 0.0, 100.0),
    FieldRange::new("cation_exchange", 0.0, 500.0),
    FieldRange::new("sand_percent", 0.0, 100.0),
    FieldRange::new("clay_percent", 0.0, 100.0),
    FieldRange::new("silt_percent", 0.0, 100.0),
    FieldRange::new("rainfall", 0.0, 20_000.0),
    FieldRange::new("elevation", -500.0, 9_000.0),
];

/// Lower bound of sand + clay + silt
pub const TEXTURE_SUM_MIN: f64 = 95.0;

/// Upper bound of sand + clay + silt
pub const TEXTURE_SUM_MAX: f64 = 105.0;

/// Slack for float error when summing decimal percentages
pub const TEXTURE_SUM_EPSILON: f64 = 1e-9;

/// Look up the range for a field name
pub fn range_for(field: &str) -> Option<&'static FieldRange> {
    FIELD_RANGES.iter().find(|r| r.field == field)
}
