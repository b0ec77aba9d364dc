//! Weight-based macronutrient recommendations.
//!
//! One coefficient table is used everywhere (grams per kg of body weight):
//!
//! | macro   | min | max | suggested |
//! |---------|-----|-----|-----------|
//! | protein | 0.8 | 2.2 | 1.5       |
//! | fat     | 0.3 | 0.8 | 0.5       |
//! | carbs   | 1.0 | 6.0 | 3.0       |
//!
//! Every value is `floor(weight_kg * coefficient)`. Weights outside
//! [`MIN_WEIGHT_KG`, `MAX_WEIGHT_KG`] produce the all-zero sentinel range.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::Macro;

pub const MIN_WEIGHT_KG: f64 = 30.0;
pub const MAX_WEIGHT_KG: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GramsPerKg {
    pub min: f64,
    pub max: f64,
    pub suggested: f64,
}

pub const PROTEIN_PER_KG: GramsPerKg = GramsPerKg { min: 0.8, max: 2.2, suggested: 1.5 };
pub const FAT_PER_KG: GramsPerKg = GramsPerKg { min: 0.3, max: 0.8, suggested: 0.5 };
pub const CARBS_PER_KG: GramsPerKg = GramsPerKg { min: 1.0, max: 6.0, suggested: 3.0 };

impl GramsPerKg {
    pub fn for_macro(m: Macro) -> Self {
        match m {
            Macro::Carbs => CARBS_PER_KG,
            Macro::Protein => PROTEIN_PER_KG,
            Macro::Fat => FAT_PER_KG,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeightError {
    #[error("please enter a weight between 30.0 and 300.0 kg")]
    OutOfRange(f64),
    #[error("please enter a weight between 30.0 and 300.0 kg")]
    Unparsable(String),
}

/// Body weight of a user. An entered-but-invalid weight is never stored;
/// it is a [`WeightError`] at the boundary instead.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "kg", rename_all = "snake_case")]
pub enum BodyWeight {
    #[default]
    NotSet,
    Valid(f64),
}

impl BodyWeight {
    pub fn new(kg: f64) -> Result<Self, WeightError> {
        if is_valid_weight(kg) {
            Ok(BodyWeight::Valid(kg))
        } else {
            Err(WeightError::OutOfRange(kg))
        }
    }

    /// Lift a nullable stored column. A stored value outside the range is
    /// reported, not silently replaced.
    pub fn from_stored(kg: Option<f64>) -> Result<Self, WeightError> {
        match kg {
            None => Ok(BodyWeight::NotSet),
            Some(kg) => BodyWeight::new(kg),
        }
    }

    pub fn kg(self) -> Option<f64> {
        match self {
            BodyWeight::NotSet => None,
            BodyWeight::Valid(kg) => Some(kg),
        }
    }
}

pub fn is_valid_weight(kg: f64) -> bool {
    (MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&kg)
}

/// Parse raw weight text as typed by a user ("72", " 68.5 ").
pub fn parse_weight(raw: &str) -> Result<f64, WeightError> {
    lazy_static! {
        static ref WEIGHT_RE: Regex = Regex::new(r"^\d{1,4}(\.\d+)?$").unwrap();
    }
    let trimmed = raw.trim();
    if !WEIGHT_RE.is_match(trimmed) {
        return Err(WeightError::Unparsable(raw.to_string()));
    }
    let kg: f64 = trimmed
        .parse()
        .map_err(|_| WeightError::Unparsable(raw.to_string()))?;
    if !is_valid_weight(kg) {
        return Err(WeightError::OutOfRange(kg));
    }
    Ok(kg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecommendationRange {
    pub min: u32,
    pub max: u32,
    pub suggested: u32,
}

impl RecommendationRange {
    pub const ZERO: RecommendationRange = RecommendationRange { min: 0, max: 0, suggested: 0 };

    /// A degenerate range is shown as a fixed value, not a slider.
    pub fn is_fixed(&self) -> bool {
        self.min >= self.max
    }

    pub fn contains(&self, grams: u32) -> bool {
        (self.min..=self.max).contains(&grams)
    }

    /// Keep a control value inside the range. Never panics, also not for
    /// degenerate ranges where it returns `min`.
    pub fn clamp(&self, grams: u32) -> u32 {
        if self.is_fixed() {
            return self.min;
        }
        grams.clamp(self.min, self.max)
    }
}

fn scaled(weight_kg: f64, coefficient: f64) -> u32 {
    (weight_kg * coefficient).floor() as u32
}

pub fn recommendation_for(m: Macro, weight_kg: f64) -> RecommendationRange {
    if !is_valid_weight(weight_kg) {
        return RecommendationRange::ZERO;
    }
    let c = GramsPerKg::for_macro(m);
    RecommendationRange {
        min: scaled(weight_kg, c.min),
        max: scaled(weight_kg, c.max),
        suggested: scaled(weight_kg, c.suggested),
    }
}

pub fn protein_recommendation(weight_kg: f64) -> RecommendationRange {
    recommendation_for(Macro::Protein, weight_kg)
}

pub fn fat_recommendation(weight_kg: f64) -> RecommendationRange {
    recommendation_for(Macro::Fat, weight_kg)
}

pub fn carbs_recommendation(weight_kg: f64) -> RecommendationRange {
    recommendation_for(Macro::Carbs, weight_kg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroRecommendations {
    pub carbs: RecommendationRange,
    pub protein: RecommendationRange,
    pub fat: RecommendationRange,
}

pub fn recommendations(weight_kg: f64) -> MacroRecommendations {
    MacroRecommendations {
        carbs: carbs_recommendation(weight_kg),
        protein: protein_recommendation(weight_kg),
        fat: fat_recommendation(weight_kg),
    }
}

/// Whether each macro of a manual goal sits inside its recommended range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeCheck {
    pub carbs: bool,
    pub protein: bool,
    pub fat: bool,
}

impl RangeCheck {
    pub fn all_within(&self) -> bool {
        self.carbs && self.protein && self.fat
    }
}

pub fn check_macros_in_range(weight_kg: f64, carbs: u32, protein: u32, fat: u32) -> RangeCheck {
    let r = recommendations(weight_kg);
    RangeCheck {
        carbs: r.carbs.contains(carbs),
        protein: r.protein.contains(protein),
        fat: r.fat.contains(fat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_bounds_are_inclusive() {
        assert!(is_valid_weight(30.0));
        assert!(is_valid_weight(300.0));
        assert!(is_valid_weight(70.0));
        assert!(!is_valid_weight(29.9));
        assert!(!is_valid_weight(300.1));
        assert!(!is_valid_weight(f64::NAN));
    }

    #[test]
    fn protein_for_70_kg() {
        assert_eq!(
            protein_recommendation(70.0),
            RecommendationRange { min: 56, max: 154, suggested: 105 }
        );
    }

    #[test]
    fn fat_and_carbs_for_70_kg() {
        assert_eq!(
            fat_recommendation(70.0),
            RecommendationRange { min: 21, max: 56, suggested: 35 }
        );
        assert_eq!(
            carbs_recommendation(70.0),
            RecommendationRange { min: 70, max: 420, suggested: 210 }
        );
    }

    #[test]
    fn fractional_weight_floors() {
        // 65.5 * 1.5 = 98.25
        assert_eq!(protein_recommendation(65.5).suggested, 98);
        // 65.5 * 0.3 = 19.65
        assert_eq!(fat_recommendation(65.5).min, 19);
    }

    #[test]
    fn invalid_weight_gives_zero_sentinel() {
        for kg in [10.0, 350.0, -1.0, f64::NAN] {
            assert_eq!(protein_recommendation(kg), RecommendationRange::ZERO);
            assert_eq!(fat_recommendation(kg), RecommendationRange::ZERO);
            assert_eq!(carbs_recommendation(kg), RecommendationRange::ZERO);
        }
    }

    #[test]
    fn ranges_are_ordered_across_valid_weights() {
        let mut kg = MIN_WEIGHT_KG;
        while kg <= MAX_WEIGHT_KG {
            for m in Macro::ALL {
                let r = recommendation_for(m, kg);
                assert!(r.min <= r.suggested, "{m:?} at {kg}: {r:?}");
                assert!(r.suggested <= r.max, "{m:?} at {kg}: {r:?}");
            }
            kg += 0.7;
        }
    }

    #[test]
    fn degenerate_range_clamps_without_panicking() {
        let fixed = RecommendationRange { min: 12, max: 12, suggested: 12 };
        assert!(fixed.is_fixed());
        assert_eq!(fixed.clamp(0), 12);
        assert_eq!(fixed.clamp(99), 12);

        assert!(RecommendationRange::ZERO.is_fixed());
        assert_eq!(RecommendationRange::ZERO.clamp(5), 0);

        let r = protein_recommendation(70.0);
        assert!(!r.is_fixed());
        assert_eq!(r.clamp(10), 56);
        assert_eq!(r.clamp(500), 154);
        assert_eq!(r.clamp(100), 100);
    }

    #[test]
    fn parse_weight_accepts_plain_numbers() {
        assert_eq!(parse_weight("72"), Ok(72.0));
        assert_eq!(parse_weight("  68.5 "), Ok(68.5));
        assert_eq!(parse_weight("30"), Ok(30.0));
    }

    #[test]
    fn parse_weight_rejects_garbage_and_range() {
        assert!(matches!(parse_weight("abc"), Err(WeightError::Unparsable(_))));
        assert!(matches!(parse_weight(""), Err(WeightError::Unparsable(_))));
        assert!(matches!(parse_weight("-70"), Err(WeightError::Unparsable(_))));
        assert!(matches!(parse_weight("70kg"), Err(WeightError::Unparsable(_))));
        assert_eq!(parse_weight("10"), Err(WeightError::OutOfRange(10.0)));
        assert_eq!(parse_weight("350.5"), Err(WeightError::OutOfRange(350.5)));
    }

    #[test]
    fn weight_error_message_is_user_facing() {
        let msg = WeightError::OutOfRange(5.0).to_string();
        assert_eq!(msg, "please enter a weight between 30.0 and 300.0 kg");
    }

    #[test]
    fn body_weight_distinguishes_unset_from_invalid() {
        assert_eq!(BodyWeight::from_stored(None), Ok(BodyWeight::NotSet));
        assert_eq!(BodyWeight::from_stored(Some(80.0)), Ok(BodyWeight::Valid(80.0)));
        assert!(BodyWeight::from_stored(Some(12.0)).is_err());
        assert_eq!(BodyWeight::Valid(80.0).kg(), Some(80.0));
        assert_eq!(BodyWeight::NotSet.kg(), None);
    }

    #[test]
    fn body_weight_serializes_with_state_tag() {
        let json = serde_json::to_value(BodyWeight::Valid(70.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "valid", "kg": 70.5 }));
        let json = serde_json::to_value(BodyWeight::NotSet).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "not_set" }));
    }

    #[test]
    fn range_check_flags_each_macro() {
        // 70 kg: carbs 70..=420, protein 56..=154, fat 21..=56
        let ok = check_macros_in_range(70.0, 210, 105, 35);
        assert!(ok.all_within());

        let check = check_macros_in_range(70.0, 500, 105, 10);
        assert!(!check.carbs);
        assert!(check.protein);
        assert!(!check.fat);
        assert!(!check.all_within());
    }
}
