use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

use super::units::total_calories;

/// Whole-gram macronutrient amounts of one meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Macros {
    pub carbs: u32,
    pub protein: u32,
    pub fat: u32,
}

impl Macros {
    pub fn new(carbs: u32, protein: u32, fat: u32) -> Self {
        Self { carbs, protein, fat }
    }

    pub fn calories(&self) -> u32 {
        total_calories(self.carbs, self.protein, self.fat)
    }
}

/// Anything that carries a meal's macros.
pub trait HasMacros {
    fn macros(&self) -> Macros;
}

impl HasMacros for Macros {
    fn macros(&self) -> Macros {
        *self
    }
}

impl<T: HasMacros + ?Sized> HasMacros for &T {
    fn macros(&self) -> Macros {
        (**self).macros()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IntakeTotals {
    pub carbs: u32,
    pub protein: u32,
    pub fat: u32,
    pub calories: u32,
}

/// Sum the entries of one window. The caller passes every entry of the
/// window exactly once; order does not matter.
pub fn aggregate<I>(entries: I) -> IntakeTotals
where
    I: IntoIterator,
    I::Item: HasMacros,
{
    let sum = entries.into_iter().fold(Macros::default(), |acc, e| {
        let m = e.macros();
        Macros {
            carbs: acc.carbs.saturating_add(m.carbs),
            protein: acc.protein.saturating_add(m.protein),
            fat: acc.fat.saturating_add(m.fat),
        }
    });
    IntakeTotals {
        carbs: sum.carbs,
        protein: sum.protein,
        fat: sum.fat,
        calories: sum.calories(),
    }
}

/// `[start of day, start of next day)` for `date` in the given offset.
/// `None` for the last representable date, which has no next day.
pub fn day_window(date: Date, offset: UtcOffset) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let next = date.next_day()?;
    Some((
        date.midnight().assume_offset(offset),
        next.midnight().assume_offset(offset),
    ))
}
