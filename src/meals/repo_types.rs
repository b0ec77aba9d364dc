use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{HasMacros, Macros};
use crate::storage::StoreError;
use crate::users::repo_types::from_int_column;

/// One logged intake event. Calories are derived from the grams on every
/// read and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub timestamp: OffsetDateTime,
    pub name: Option<String>,
    pub macros: Macros,
}

impl MealEntry {
    pub fn new(
        user_id: Uuid,
        timestamp: OffsetDateTime,
        name: Option<String>,
        macros: Macros,
    ) -> Self {
        Self { id: Uuid::new_v4(), user_id, timestamp, name, macros }
    }

    pub fn calories(&self) -> u32 {
        self.macros.calories()
    }
}

impl HasMacros for MealEntry {
    fn macros(&self) -> Macros {
        self.macros
    }
}

/// Row shape of the `meals` table.
#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub eaten_at: OffsetDateTime,
    pub name: Option<String>,
    pub carbs_g: i32,
    pub protein_g: i32,
    pub fat_g: i32,
}

impl TryFrom<MealRow> for MealEntry {
    type Error = StoreError;

    fn try_from(r: MealRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            timestamp: r.eaten_at,
            name: r.name,
            macros: Macros::new(
                from_int_column("carbs_g", r.carbs_g)?,
                from_int_column("protein_g", r.protein_g)?,
                from_int_column("fat_g", r.fat_g)?,
            ),
        })
    }
}
