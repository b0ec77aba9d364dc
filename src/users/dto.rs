use serde::{Deserialize, Serialize};

use crate::nutrition::recommend::RangeCheck;
use crate::nutrition::units::Macro;
use crate::nutrition::{
    check_grams, parse_weight, BodyWeight, GramsError, MacroRecommendations,
    RecommendationRange, WeightError, MAX_MACRO_GRAMS,
};
use crate::users::repo_types::User;

/// Weight as sent by a client: either a JSON number or the raw text field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WeightInput {
    Number(f64),
    Text(String),
}

impl WeightInput {
    pub fn validate(&self) -> Result<BodyWeight, WeightError> {
        match self {
            WeightInput::Number(kg) => BodyWeight::new(*kg),
            WeightInput::Text(raw) => parse_weight(raw).and_then(BodyWeight::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetWeightRequest {
    pub weight: WeightInput,
    /// Replace the daily goal with the weight-derived one.
    #[serde(default)]
    pub apply_goal: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetGoalRequest {
    pub carbs: u32,
    pub protein: u32,
    pub fat: u32,
}

impl SetGoalRequest {
    pub fn validate(&self) -> Result<(), GramsError> {
        check_grams(self.carbs, self.protein, self.fat)
    }
}

/// Live slider values, possibly fractional.
#[derive(Debug, Deserialize)]
pub struct GoalPreviewQuery {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

impl GoalPreviewQuery {
    pub fn validate(&self) -> Result<(), String> {
        let max = f64::from(MAX_MACRO_GRAMS);
        for (nutrient, grams) in Macro::ALL.into_iter().zip([self.carbs, self.protein, self.fat]) {
            if !(0.0..=max).contains(&grams) {
                return Err(format!(
                    "{} must be between 0 and {MAX_MACRO_GRAMS} g",
                    nutrient.name()
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct GoalPreviewResponse {
    pub calories: u32,
}

/// A recommendation range plus whether it collapses to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeView {
    pub min: u32,
    pub max: u32,
    pub suggested: u32,
    pub fixed: bool,
}

impl From<RecommendationRange> for RangeView {
    fn from(r: RecommendationRange) -> Self {
        Self { min: r.min, max: r.max, suggested: r.suggested, fixed: r.is_fixed() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecommendationsView {
    pub carbs: RangeView,
    pub protein: RangeView,
    pub fat: RangeView,
}

impl From<MacroRecommendations> for RecommendationsView {
    fn from(r: MacroRecommendations) -> Self {
        Self { carbs: r.carbs.into(), protein: r.protein.into(), fat: r.fat.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    /// Present once a weight is set.
    pub recommendations: Option<RecommendationsView>,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub user: User,
    /// Whether each macro sits inside the weight-based range. Advisory only;
    /// absent without a weight.
    pub within_recommended: Option<RangeCheck>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub weight: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub weight_kg: f64,
    pub recommendations: RecommendationsView,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_recent_limit")]
    pub limit: i64,
}

fn default_recent_limit() -> i64 {
    10
}

/// Entry of the login quick-select list.
#[derive(Debug, Serialize)]
pub struct RecentUser {
    pub id: uuid::Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<time::OffsetDateTime>,
}

impl From<User> for RecentUser {
    fn from(u: User) -> Self {
        Self { id: u.id, name: u.name, last_login_at: u.last_login_at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_accepts_number_or_text() {
        let req: SetWeightRequest = serde_json::from_str(r#"{"weight": 72.5}"#).unwrap();
        assert_eq!(req.weight.validate(), Ok(BodyWeight::Valid(72.5)));
        assert!(!req.apply_goal);

        let req: SetWeightRequest =
            serde_json::from_str(r#"{"weight": " 68 ", "apply_goal": true}"#).unwrap();
        assert_eq!(req.weight.validate(), Ok(BodyWeight::Valid(68.0)));
        assert!(req.apply_goal);
    }

    #[test]
    fn weight_rejects_bad_input() {
        assert!(matches!(
            WeightInput::Number(12.0).validate(),
            Err(WeightError::OutOfRange(_))
        ));
        assert!(matches!(
            WeightInput::Text("abc".into()).validate(),
            Err(WeightError::Unparsable(_))
        ));
        assert!(WeightInput::Text("301".into()).validate().is_err());
    }

    #[test]
    fn oversized_goal_grams_fail_validation() {
        let req: SetGoalRequest =
            serde_json::from_str(r#"{"carbs":4000000000,"protein":1,"fat":1}"#).unwrap();
        assert!(req.validate().is_err());
        let req: SetGoalRequest =
            serde_json::from_str(r#"{"carbs":210,"protein":105,"fat":35}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn range_view_marks_degenerate_range() {
        let fixed = RangeView::from(RecommendationRange { min: 20, max: 20, suggested: 20 });
        assert!(fixed.fixed);
        assert!(RangeView::from(RecommendationRange::ZERO).fixed);
        let open = RangeView::from(RecommendationRange { min: 56, max: 154, suggested: 105 });
        assert!(!open.fixed);
    }

    #[test]
    fn preview_rejects_out_of_bounds() {
        let ok = GoalPreviewQuery { carbs: 210.4, protein: 0.0, fat: 35.5 };
        assert!(ok.validate().is_ok());
        let neg = GoalPreviewQuery { carbs: -1.0, protein: 0.0, fat: 0.0 };
        assert!(neg.validate().is_err());
        let nan = GoalPreviewQuery { carbs: 1.0, protein: f64::NAN, fat: 0.0 };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn negative_goal_grams_fail_to_deserialize() {
        let res = serde_json::from_str::<SetGoalRequest>(r#"{"carbs":-1,"protein":1,"fat":1}"#);
        assert!(res.is_err());
    }
}
