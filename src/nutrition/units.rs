use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Energy density of carbohydrates, kcal per gram.
pub const CARBS_KCAL_PER_GRAM: u32 = 4;
/// Energy density of protein, kcal per gram.
pub const PROTEIN_KCAL_PER_GRAM: u32 = 4;
/// Energy density of fat, kcal per gram.
pub const FAT_KCAL_PER_GRAM: u32 = 9;

/// Upper bound for one macro in a goal or a logged meal. At this bound the
/// kcal total of a goal or meal is still exact and fits an `INTEGER` column.
pub const MAX_MACRO_GRAMS: u32 = 100_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Macro {
    Carbs,
    Protein,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 3] = [Macro::Carbs, Macro::Protein, Macro::Fat];

    pub fn name(self) -> &'static str {
        match self {
            Macro::Carbs => "carbs",
            Macro::Protein => "protein",
            Macro::Fat => "fat",
        }
    }

    pub fn kcal_per_gram(self) -> u32 {
        match self {
            Macro::Carbs => CARBS_KCAL_PER_GRAM,
            Macro::Protein => PROTEIN_KCAL_PER_GRAM,
            Macro::Fat => FAT_KCAL_PER_GRAM,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{} must be at most {} g, got {grams}", .nutrient.name(), MAX_MACRO_GRAMS)]
pub struct GramsError {
    pub nutrient: Macro,
    pub grams: u32,
}

/// Reject gram amounts above [`MAX_MACRO_GRAMS`] before they reach a goal
/// or a meal.
pub fn check_grams(carbs: u32, protein: u32, fat: u32) -> Result<(), GramsError> {
    for (nutrient, grams) in Macro::ALL.into_iter().zip([carbs, protein, fat]) {
        if grams > MAX_MACRO_GRAMS {
            return Err(GramsError { nutrient, grams });
        }
    }
    Ok(())
}

/// Calories contributed by `grams` of a single macronutrient.
pub fn macro_calories(m: Macro, grams: u32) -> u32 {
    grams.saturating_mul(m.kcal_per_gram())
}

/// Total kcal for whole-gram macros. Exact; saturates instead of wrapping.
pub fn total_calories(carbs: u32, protein: u32, fat: u32) -> u32 {
    macro_calories(Macro::Carbs, carbs)
        .saturating_add(macro_calories(Macro::Protein, protein))
        .saturating_add(macro_calories(Macro::Fat, fat))
}

/// Total kcal for fractional grams (slider drag values), rounded to the
/// nearest kcal. Negative totals come out as 0.
pub fn total_calories_rounded(carbs: f64, protein: f64, fat: f64) -> u32 {
    let kcal = carbs * f64::from(CARBS_KCAL_PER_GRAM)
        + protein * f64::from(PROTEIN_KCAL_PER_GRAM)
        + fat * f64::from(FAT_KCAL_PER_GRAM);
    if kcal.is_nan() || kcal <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX for huge values
    kcal.round() as u32
}
