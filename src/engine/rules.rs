//! Fertilizer rule chain
//!
//! Base selection is a decision list (first match wins). Adjustments are
//! then applied in a fixed order: organic carbon, CEC, texture,
//! environment, crop override, variance. Clamping happens last.

use crate::engine::variance::Variance;
use crate::types::{Crop, SoilInput};
use serde::{Deserialize, Serialize};

pub const RATE_MIN: f64 = 50.0;
pub const RATE_MAX: f64 = 300.0;
pub const CONFIDENCE_MIN: f64 = 70.0;
pub const CONFIDENCE_MAX: f64 = 98.0;
pub const YIELD_MIN: f64 = 5.0;
pub const YIELD_MAX: f64 = 35.0;

/// Row of the base decision list that matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseRule {
    Default,
    /// nitrogen < 0.15
    NitrogenDeficient,
    /// nitrogen < 0.25 and phosphorus < 12
    NitrogenPhosphorusDeficient,
    /// phosphorus < 10
    PhosphorusDeficient,
    /// potassium < 80
    PotassiumDeficient,
    /// potassium < 120 and nitrogen > 0.3
    PotassiumLowHighNitrogen,
}

impl BaseRule {
    /// Starting values for this rule: (fertilizer, rate, confidence, yieldΔ)
    pub fn base_values(&self) -> (&'static str, f64, f64, f64) {
        match self {
            BaseRule::Default => ("NPK 17-17-17", 150.0, 85.0, 15.0),
            BaseRule::NitrogenDeficient => ("Urea", 120.0, 94.0, 25.0),
            BaseRule::NitrogenPhosphorusDeficient => ("DAP (Diammonium Phosphate)", 110.0, 91.0, 22.0),
            BaseRule::PhosphorusDeficient => ("TSP (Triple Super Phosphate)", 100.0, 89.0, 20.0),
            BaseRule::PotassiumDeficient => ("NPK 15-15-15", 140.0, 87.0, 18.0),
            BaseRule::PotassiumLowHighNitrogen => ("NPK 20-10-10", 130.0, 90.0, 17.0),
        }
    }
}

/// Evaluate the decision list top to bottom
pub fn select_base_rule(input: &SoilInput) -> BaseRule {
    if input.nitrogen < 0.15 {
        BaseRule::NitrogenDeficient
    } else if input.nitrogen < 0.25 && input.phosphorus < 12.0 {
        BaseRule::NitrogenPhosphorusDeficient
    } else if input.phosphorus < 10.0 {
        BaseRule::PhosphorusDeficient
    } else if input.potassium < 80.0 {
        BaseRule::PotassiumDeficient
    } else if input.potassium < 120.0 && input.nitrogen > 0.3 {
        BaseRule::PotassiumLowHighNitrogen
    } else {
        BaseRule::Default
    }
}

/// Unclamped result of the rule chain
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub base_rule: BaseRule,
    pub fertilizer: String,
    pub rate: f64,
    pub confidence: f64,
    pub yield_increase: f64,
}

impl Assessment {
    fn from_rule(base_rule: BaseRule) -> Self {
        let (fertilizer, rate, confidence, yield_increase) = base_rule.base_values();
        Self {
            base_rule,
            fertilizer: fertilizer.to_string(),
            rate,
            confidence,
            yield_increase,
        }
    }

    /// Rate clamped to [50, 300], nearest integer
    pub fn clamped_rate(&self) -> u32 {
        self.rate.clamp(RATE_MIN, RATE_MAX).round() as u32
    }

    /// Confidence clamped to [70, 98], one decimal
    pub fn clamped_confidence(&self) -> f64 {
        round_one_decimal(self.confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX))
    }

    /// Yield increase clamped to [5, 35], nearest integer
    pub fn clamped_yield(&self) -> u32 {
        self.yield_increase.clamp(YIELD_MIN, YIELD_MAX).round() as u32
    }

    fn adjust_organic_carbon(&mut self, organic_carbon: f64) {
        if organic_carbon < 1.0 {
            self.rate *= 1.15;
            self.yield_increase += 3.0;
        } else if organic_carbon > 3.0 {
            self.rate *= 0.9;
            self.confidence += 5.0;
        }
    }

    fn adjust_cation_exchange(&mut self, cec: f64) {
        if cec < 5.0 {
            self.rate *= 0.85;
            self.confidence -= 5.0;
        } else if cec > 25.0 {
            self.rate *= 1.1;
            self.confidence += 3.0;
        }
    }

    fn adjust_texture(&mut self, input: &SoilInput) {
        if input.clay_percent > 60.0 {
            self.rate *= 1.1;
            self.confidence -= 3.0;
        } else if input.sand_percent > 70.0 {
            // Sandy soils leach; split the dose
            self.rate *= 1.2;
            self.confidence -= 2.0;
            if self.fertilizer.contains("NPK") {
                self.fertilizer.push_str(" (Split Application)");
            }
        }
    }

    fn adjust_environment(&mut self, input: &SoilInput) {
        if input.rainfall < 600.0 {
            self.rate *= 0.9;
            self.yield_increase -= 2.0;
        }
        if input.rainfall > 1500.0 {
            self.rate *= 1.15;
            self.yield_increase -= 1.0;
        }
        if input.elevation > 2000.0 {
            self.rate *= 0.95;
            self.confidence -= 2.0;
        }
    }

    fn apply_crop_override(&mut self, input: &SoilInput) {
        match input.crop() {
            Crop::Rice => {
                self.rate *= 1.25;
                if input.nitrogen < 0.2 {
                    self.fertilizer = "Urea + NPK 15-15-15 (Split Application)".to_string();
                    self.confidence += 5.0;
                }
                self.yield_increase += 8.0;
            }
            Crop::Maize => {
                self.rate *= 1.1;
                if input.nitrogen < 0.25 {
                    self.fertilizer = "NPK 23-10-5".to_string();
                    self.confidence += 3.0;
                }
                self.yield_increase += 5.0;
            }
            Crop::Beans => {
                // Legumes fix their own nitrogen
                self.rate *= 0.7;
                self.fertilizer = "NPK 10-20-10".to_string();
                self.confidence += 7.0;
                self.yield_increase += 3.0;
            }
            Crop::Potato => {
                self.rate *= 1.15;
                if input.potassium < 150.0 {
                    self.fertilizer = "NPK 15-15-20".to_string();
                    self.confidence += 4.0;
                }
                self.yield_increase += 6.0;
            }
            Crop::Cassava => {
                self.rate *= 0.8;
                self.fertilizer = "NPK 15-15-15".to_string();
                self.yield_increase += 4.0;
            }
            Crop::Banana => {
                self.rate *= 1.3;
                self.fertilizer = "NPK 17-6-18".to_string();
                self.yield_increase += 7.0;
            }
            Crop::Other(_) => {}
        }
    }

    fn apply_variance(&mut self, variance: Variance) {
        self.rate *= 1.0 + variance.rate_jitter;
        self.confidence += variance.confidence_jitter;
    }
}

/// Run the full rule chain up to (not including) clamping
pub fn assess(input: &SoilInput, variance: Variance) -> Assessment {
    let mut assessment = Assessment::from_rule(select_base_rule(input));

    assessment.adjust_organic_carbon(input.organic_carbon);
    assessment.adjust_cation_exchange(input.cation_exchange);
    assessment.adjust_texture(input);
    assessment.adjust_environment(input);
    assessment.apply_crop_override(input);
    assessment.apply_variance(variance);

    assessment
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Neutral input: default rule, no adjustment fires, unknown crop
    fn neutral() -> SoilInput {
        SoilInput {
            phosphorus: 20.0,
            potassium: 200.0,
            nitrogen: 0.25,
            organic_carbon: 2.0,
            cation_exchange: 15.0,
            sand_percent: 40.0,
            clay_percent: 30.0,
            silt_percent: 30.0,
            rainfall: 1000.0,
            elevation: 1000.0,
            crop_type: "sorghum".to_string(),
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_rule_untouched() {
        let a = assess(&neutral(), Variance::NONE);
        assert_eq!(a.base_rule, BaseRule::Default);
        assert_eq!(a.fertilizer, "NPK 17-17-17");
        assert!(close(a.rate, 150.0));
        assert!(close(a.confidence, 85.0));
        assert!(close(a.yield_increase, 15.0));
    }

    #[test]
    fn test_rule_precedence_nitrogen_first() {
        let mut input = neutral();
        input.nitrogen = 0.10;
        input.phosphorus = 5.0;
        input.potassium = 50.0;
        assert_eq!(select_base_rule(&input), BaseRule::NitrogenDeficient);
    }

    #[test]
    fn test_each_rule_reachable() {
        let mut input = neutral();
        input.nitrogen = 0.2;
        input.phosphorus = 11.0;
        assert_eq!(select_base_rule(&input), BaseRule::NitrogenPhosphorusDeficient);

        let mut input = neutral();
        input.phosphorus = 9.0;
        assert_eq!(select_base_rule(&input), BaseRule::PhosphorusDeficient);

        let mut input = neutral();
        input.potassium = 79.0;
        assert_eq!(select_base_rule(&input), BaseRule::PotassiumDeficient);

        let mut input = neutral();
        input.potassium = 100.0;
        input.nitrogen = 0.35;
        assert_eq!(select_base_rule(&input), BaseRule::PotassiumLowHighNitrogen);
    }

    #[test]
    fn test_rule_thresholds_are_strict() {
        let mut input = neutral();
        input.nitrogen = 0.15;
        input.phosphorus = 12.0;
        assert_eq!(select_base_rule(&input), BaseRule::Default);

        input.potassium = 120.0;
        input.nitrogen = 0.31;
        assert_eq!(select_base_rule(&input), BaseRule::Default);

        input.potassium = 80.0;
        input.nitrogen = 0.3;
        assert_eq!(select_base_rule(&input), BaseRule::Default);
    }

    #[test]
    fn test_low_organic_carbon() {
        let mut input = neutral();
        input.organic_carbon = 0.5;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 150.0 * 1.15));
        assert!(close(a.yield_increase, 18.0));
    }

    #[test]
    fn test_high_organic_carbon() {
        let mut input = neutral();
        input.organic_carbon = 3.5;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 135.0));
        assert!(close(a.confidence, 90.0));
    }

    #[test]
    fn test_cation_exchange_adjustments() {
        let mut input = neutral();
        input.cation_exchange = 3.0;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 150.0 * 0.85));
        assert!(close(a.confidence, 80.0));

        input.cation_exchange = 30.0;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 150.0 * 1.1));
        assert!(close(a.confidence, 88.0));
    }

    #[test]
    fn test_heavy_clay_beats_sand() {
        let mut input = neutral();
        input.clay_percent = 65.0;
        input.sand_percent = 20.0;
        input.silt_percent = 15.0;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 150.0 * 1.1));
        assert!(close(a.confidence, 82.0));
        assert_eq!(a.fertilizer, "NPK 17-17-17");
    }

    #[test]
    fn test_sandy_soil_splits_npk() {
        let mut input = neutral();
        input.sand_percent = 75.0;
        input.clay_percent = 10.0;
        input.silt_percent = 15.0;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 180.0));
        assert!(close(a.confidence, 83.0));
        assert_eq!(a.fertilizer, "NPK 17-17-17 (Split Application)");
    }

    #[test]
    fn test_sandy_soil_leaves_non_npk_name() {
        let mut input = neutral();
        input.sand_percent = 75.0;
        input.clay_percent = 10.0;
        input.silt_percent = 15.0;
        input.nitrogen = 0.1;
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "Urea");
    }

    #[test]
    fn test_environment_checks_are_independent() {
        let mut input = neutral();
        input.rainfall = 500.0;
        input.elevation = 2500.0;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 150.0 * 0.9 * 0.95));
        assert!(close(a.yield_increase, 13.0));
        assert!(close(a.confidence, 83.0));

        input.rainfall = 1800.0;
        input.elevation = 100.0;
        let a = assess(&input, Variance::NONE);
        assert!(close(a.rate, 150.0 * 1.15));
        assert!(close(a.yield_increase, 14.0));
    }

    #[test]
    fn test_rice_override() {
        let mut input = neutral();
        input.crop_type = "Rice".to_string();
        input.nitrogen = 0.18;
        input.phosphorus = 20.0;
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "Urea + NPK 15-15-15 (Split Application)");
        assert!(close(a.rate, 150.0 * 1.25));
        assert!(close(a.confidence, 90.0));
        assert!(close(a.yield_increase, 23.0));
    }

    #[test]
    fn test_maize_without_override() {
        let mut input = neutral();
        input.crop_type = "maize".to_string();
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "NPK 17-17-17");
        assert!(close(a.confidence, 85.0));
        assert!(close(a.yield_increase, 20.0));
    }

    #[test]
    fn test_beans_always_override() {
        let mut input = neutral();
        input.crop_type = "beans".to_string();
        input.nitrogen = 0.1;
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.base_rule, BaseRule::NitrogenDeficient);
        assert_eq!(a.fertilizer, "NPK 10-20-10");
        assert!(close(a.rate, 120.0 * 0.7));
        assert!(close(a.confidence, 101.0));
        assert_eq!(a.clamped_confidence(), 98.0);
    }

    #[test]
    fn test_potato_override_depends_on_potassium() {
        let mut input = neutral();
        input.crop_type = "potato".to_string();
        input.potassium = 140.0;
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "NPK 15-15-20");
        assert!(close(a.confidence, 89.0));
        assert!(close(a.yield_increase, 21.0));

        input.potassium = 150.0;
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "NPK 17-17-17");
        assert!(close(a.confidence, 85.0));
    }

    #[test]
    fn test_cassava_and_banana() {
        let mut input = neutral();
        input.crop_type = "cassava".to_string();
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "NPK 15-15-15");
        assert!(close(a.rate, 120.0));
        assert!(close(a.yield_increase, 19.0));

        input.crop_type = "banana".to_string();
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "NPK 17-6-18");
        assert!(close(a.rate, 195.0));
        assert!(close(a.yield_increase, 22.0));
    }

    #[test]
    fn test_crop_override_replaces_split_annotation() {
        let mut input = neutral();
        input.sand_percent = 75.0;
        input.clay_percent = 10.0;
        input.silt_percent = 15.0;
        input.crop_type = "banana".to_string();
        let a = assess(&input, Variance::NONE);
        assert_eq!(a.fertilizer, "NPK 17-6-18");
    }

    #[test]
    fn test_variance_applied_last() {
        let a = assess(&neutral(), Variance::bounded(0.05, -4.0));
        assert!(close(a.rate, 157.5));
        assert!(close(a.confidence, 81.0));
    }

    #[test]
    fn test_clamping_and_rounding() {
        let a = Assessment {
            base_rule: BaseRule::Default,
            fertilizer: "NPK 17-17-17".to_string(),
            rate: 412.7,
            confidence: 63.24,
            yield_increase: 1.0,
        };
        assert_eq!(a.clamped_rate(), 300);
        assert_eq!(a.clamped_confidence(), 70.0);
        assert_eq!(a.clamped_yield(), 5);

        let b = Assessment {
            rate: 164.5,
            confidence: 87.26,
            yield_increase: 19.5,
            ..a
        };
        assert_eq!(b.clamped_rate(), 165);
        assert!(close(b.clamped_confidence(), 87.3));
        assert_eq!(b.clamped_yield(), 20);
    }
}
