use serde::Serialize;

use super::recommend::{carbs_recommendation, fat_recommendation, protein_recommendation};
use super::units::total_calories;

/// Daily intake target. `calories` always follows from the three macros;
/// there is no way to build a goal with an independent calorie value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyGoal {
    calories: u32,
    carbs: u32,
    protein: u32,
    fat: u32,
}

impl DailyGoal {
    pub fn calories(&self) -> u32 {
        self.calories
    }

    pub fn carbs(&self) -> u32 {
        self.carbs
    }

    pub fn protein(&self) -> u32 {
        self.protein
    }

    pub fn fat(&self) -> u32 {
        self.fat
    }

    /// Goals given to a user on first login, before the weight setup.
    pub fn placeholder() -> Self {
        // Historical defaults; 2000 is kept as-is rather than derived.
        Self { calories: 2000, carbs: 250, protein: 125, fat: 56 }
    }

    /// Rebuild from persisted columns. The stored calorie column is ignored
    /// and recomputed, except for the untouched first-login placeholder.
    pub fn from_stored(calories: u32, carbs: u32, protein: u32, fat: u32) -> Self {
        let placeholder = Self::placeholder();
        if calories == placeholder.calories
            && carbs == placeholder.carbs
            && protein == placeholder.protein
            && fat == placeholder.fat
        {
            return placeholder;
        }
        goal_from_macros(carbs, protein, fat)
    }
}

/// Auto mode: suggested grams for the weight. Invalid weight gives the
/// all-zero goal; validate with `is_valid_weight` first.
pub fn goal_from_weight(weight_kg: f64) -> DailyGoal {
    goal_from_macros(
        carbs_recommendation(weight_kg).suggested,
        protein_recommendation(weight_kg).suggested,
        fat_recommendation(weight_kg).suggested,
    )
}

/// Manual override mode.
pub fn goal_from_macros(carbs: u32, protein: u32, fat: u32) -> DailyGoal {
    DailyGoal {
        calories: total_calories(carbs, protein, fat),
        carbs,
        protein,
        fat,
    }
}
