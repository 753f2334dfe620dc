//! Raw model labels to human-readable fertilizer names

/// Label → display name pairs emitted by the trained classifier
pub const FERTILIZER_LABELS: [(&str, &str); 7] = [
    ("Add_Urea", "Urea"),
    ("Add_SSP", "Single Super Phosphate"),
    ("Add_Potash", "Potash"),
    ("Add_NK", "NK Blend"),
    ("Add_DAP", "DAP (Diammonium Phosphate)"),
    ("Add_NPK_17_17_17", "NPK 17-17-17"),
    ("No_Fertilizer_Needed", "No Fertilizer Needed"),
];

/// Map a raw classifier label to its display name; other names pass through
pub fn normalize_fertilizer_label(label: &str) -> String {
    FERTILIZER_LABELS
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| label.to_string())
}
