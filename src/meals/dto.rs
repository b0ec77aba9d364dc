use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use crate::meals::repo_types::MealEntry;
use crate::nutrition::{
    check_grams, progress::calorie_share_of_goal, DailyGoal, DailySummary, GramsError,
    IntakeTotals,
};

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: Option<String>,
    pub carbs: u32,
    pub protein: u32,
    pub fat: u32,
    /// Defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl CreateMealRequest {
    pub fn validate(&self) -> Result<(), GramsError> {
        check_grams(self.carbs, self.protein, self.fat)
    }
}

#[derive(Debug, Serialize)]
pub struct MealView {
    pub id: Uuid,
    pub name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub carbs: u32,
    pub protein: u32,
    pub fat: u32,
    pub calories: u32,
    /// Percent of the daily calorie goal this meal covers.
    pub share_of_goal: u32,
}

impl MealView {
    pub fn new(meal: MealEntry, goal: &DailyGoal) -> Self {
        Self {
            calories: meal.calories(),
            share_of_goal: calorie_share_of_goal(&meal, goal),
            id: meal.id,
            timestamp: meal.timestamp,
            carbs: meal.macros.carbs,
            protein: meal.macros.protein,
            fat: meal.macros.fat,
            name: meal.name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    /// `YYYY-MM-DD`; today in the configured offset when absent.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}
fn default_limit() -> i64 { 20 }

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub date: Option<String>,
    /// Calories burned from an activity source, 0 when not supplied.
    #[serde(default)]
    pub burned: u32,
}

#[derive(Debug, Serialize)]
pub struct DayMealsResponse {
    pub date: String,
    pub meals: Vec<MealView>,
    pub totals: IntakeTotals,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub date: String,
    pub meal_count: usize,
    pub goal: DailyGoal,
    pub intake: IntakeTotals,
    pub summary: DailySummary,
}

pub fn parse_day(raw: Option<&str>, offset: UtcOffset) -> Result<Date, time::error::Parse> {
    match raw {
        Some(s) => Date::parse(s.trim(), DAY_FORMAT),
        None => Ok(OffsetDateTime::now_utc().to_offset(offset).date()),
    }
}

pub fn format_day(date: Date) -> String {
    date.format(DAY_FORMAT).unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{goal_from_macros, Macros};
    use time::macros::{date, datetime};

    #[test]
    fn parses_calendar_day() {
        let day = parse_day(Some("2025-08-24"), UtcOffset::UTC).unwrap();
        assert_eq!(day, date!(2025 - 08 - 24));
        assert_eq!(format_day(day), "2025-08-24");
        assert!(parse_day(Some("24.08.2025"), UtcOffset::UTC).is_err());
        assert!(parse_day(Some("2025-02-30"), UtcOffset::UTC).is_err());
    }

    #[test]
    fn meal_view_carries_calories_and_share() {
        let goal = goal_from_macros(120, 180, 180);
        let meal = MealEntry::new(
            Uuid::new_v4(),
            datetime!(2025-08-24 8:00 UTC),
            Some("oats".into()),
            Macros::new(40, 60, 60),
        );
        let view = MealView::new(meal, &goal);
        assert_eq!(view.calories, 40 * 4 + 60 * 4 + 60 * 9);
        // 940 of 2820 kcal
        assert_eq!(view.share_of_goal, 33);
    }

    #[test]
    fn last_calendar_date_still_parses() {
        // the handler rejects it because the day has no end
        assert_eq!(parse_day(Some("9999-12-31"), UtcOffset::UTC).unwrap(), Date::MAX);
    }

    #[test]
    fn oversized_meal_grams_fail_validation() {
        let req: CreateMealRequest =
            serde_json::from_str(r#"{"carbs": 10, "protein": 5, "fat": 4000000000}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_defaults_timestamp() {
        let req: CreateMealRequest =
            serde_json::from_str(r#"{"carbs": 10, "protein": 5, "fat": 2}"#).unwrap();
        assert!(req.timestamp.is_none());
        assert!(req.name.is_none());

        let req: CreateMealRequest = serde_json::from_str(
            r#"{"name":"toast","carbs":30,"protein":4,"fat":3,"timestamp":"2025-08-24T07:30:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.timestamp, Some(datetime!(2025-08-24 7:30 UTC)));
    }
}
