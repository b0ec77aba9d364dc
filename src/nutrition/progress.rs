//! Display metrics for a day: goal vs intake.
//!
//! Everything here is a pure function of `(DailyGoal, IntakeTotals)` and is
//! recomputed on each read.

use serde::Serialize;

use super::goals::DailyGoal;
use super::intake::{HasMacros, IntakeTotals};
use super::units::{macro_calories, Macro};

/// `current / goal`, or 0 when no goal is set. Never NaN or infinite.
pub fn progress(current: u32, goal: u32) -> f64 {
    if goal == 0 {
        return 0.0;
    }
    f64::from(current) / f64::from(goal)
}

/// Rounded percent of a progress ratio. Over-goal values are not clamped.
pub fn percentage(progress: f64) -> u32 {
    if !progress.is_finite() || progress <= 0.0 {
        return 0;
    }
    (progress * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientProgress {
    pub current: u32,
    pub goal: u32,
    pub unit: &'static str,
    pub progress: f64,
    pub percentage: u32,
}

impl NutrientProgress {
    pub fn grams(current: u32, goal: u32) -> Self {
        let p = progress(current, goal);
        Self { current, goal, unit: "g", progress: p, percentage: percentage(p) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CalorieDistribution {
    pub carbs: u32,
    pub protein: u32,
    pub fat: u32,
}

pub fn calorie_distribution(carbs: u32, protein: u32, fat: u32) -> CalorieDistribution {
    CalorieDistribution {
        carbs: macro_calories(Macro::Carbs, carbs),
        protein: macro_calories(Macro::Protein, protein),
        fat: macro_calories(Macro::Fat, fat),
    }
}

/// Each macro's share of the three-macro kcal sum, as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MacroShares {
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

pub fn macro_shares(carbs: u32, protein: u32, fat: u32) -> MacroShares {
    let d = calorie_distribution(carbs, protein, fat);
    let sum = f64::from(d.carbs) + f64::from(d.protein) + f64::from(d.fat);
    if sum == 0.0 {
        return MacroShares::default();
    }
    MacroShares {
        carbs: f64::from(d.carbs) / sum,
        protein: f64::from(d.protein) / sum,
        fat: f64::from(d.fat) / sum,
    }
}

pub fn remaining_calories(goal: u32, consumed: u32, burned: u32) -> i64 {
    i64::from(goal) - i64::from(consumed) + i64::from(burned)
}

/// Unweighted mean of the three per-nutrient ratios. Can exceed 1.0.
pub fn total_nutrient_progress(carbs: f64, protein: f64, fat: f64) -> f64 {
    (carbs + protein + fat) / 3.0
}

/// Percent of the daily calorie goal a single meal covers.
pub fn calorie_share_of_goal<M: HasMacros>(meal: &M, goal: &DailyGoal) -> u32 {
    percentage(progress(meal.macros().calories(), goal.calories()))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalorieSummary {
    pub consumed: u32,
    pub burned: u32,
    pub goal: u32,
    pub remaining: i64,
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySummary {
    pub carbs: NutrientProgress,
    pub protein: NutrientProgress,
    pub fat: NutrientProgress,
    pub calories: CalorieSummary,
    pub distribution: CalorieDistribution,
    pub shares: MacroShares,
    pub total_nutrient_progress: f64,
}

/// `burned` comes from an external activity source and is 0 without one.
pub fn summarize(goal: &DailyGoal, intake: &IntakeTotals, burned: u32) -> DailySummary {
    let carbs = NutrientProgress::grams(intake.carbs, goal.carbs());
    let protein = NutrientProgress::grams(intake.protein, goal.protein());
    let fat = NutrientProgress::grams(intake.fat, goal.fat());

    DailySummary {
        calories: CalorieSummary {
            consumed: intake.calories,
            burned,
            goal: goal.calories(),
            remaining: remaining_calories(goal.calories(), intake.calories, burned),
            progress: progress(intake.calories, goal.calories()),
        },
        distribution: calorie_distribution(intake.carbs, intake.protein, intake.fat),
        shares: macro_shares(intake.carbs, intake.protein, intake.fat),
        total_nutrient_progress: total_nutrient_progress(
            carbs.progress,
            protein.progress,
            fat.progress,
        ),
        carbs,
        protein,
        fat,
    }
}
