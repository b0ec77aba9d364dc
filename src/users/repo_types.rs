use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::{BodyWeight, DailyGoal};
use crate::storage::StoreError;

/// A tracked person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub weight: BodyWeight,
    pub goal: DailyGoal,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// First-login record: no weight yet, placeholder goals.
    pub fn new(name: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            weight: BodyWeight::NotSet,
            goal: DailyGoal::placeholder(),
            last_login_at: Some(now),
            created_at: now,
        }
    }
}

/// Row shape of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub weight_kg: Option<f64>,
    pub daily_calorie_goal: i32,
    pub daily_carbs_goal: i32,
    pub daily_protein_goal: i32,
    pub daily_fat_goal: i32,
    pub last_login_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

pub(crate) fn from_int_column(column: &str, v: i32) -> Result<u32, StoreError> {
    u32::try_from(v).map_err(|_| StoreError::Invalid(format!("{column} is negative: {v}")))
}

pub(crate) fn to_int_column(column: &str, v: u32) -> Result<i32, StoreError> {
    i32::try_from(v).map_err(|_| StoreError::Invalid(format!("{column} too large: {v}")))
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let weight = BodyWeight::from_stored(r.weight_kg)
            .map_err(|e| StoreError::Invalid(format!("user {}: {e}", r.id)))?;
        let goal = DailyGoal::from_stored(
            from_int_column("daily_calorie_goal", r.daily_calorie_goal)?,
            from_int_column("daily_carbs_goal", r.daily_carbs_goal)?,
            from_int_column("daily_protein_goal", r.daily_protein_goal)?,
            from_int_column("daily_fat_goal", r.daily_fat_goal)?,
        );
        Ok(Self {
            id: r.id,
            name: r.name,
            weight,
            goal,
            last_login_at: r.last_login_at,
            created_at: r.created_at,
        })
    }
}
