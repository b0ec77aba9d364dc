use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::repo_types::MealEntry;
use crate::users::repo_types::User;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("invalid record: {0}")]
    Invalid(String),
    /// A unique key is already taken.
    #[error("already exists: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Exact, case-sensitive match.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;
    /// Insert a user that has just logged in for the first time. A taken
    /// name is `Conflict`.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;
    /// Overwrite weight and goal columns.
    async fn save_user(&self, user: &User) -> Result<(), StoreError>;
    async fn touch_login(&self, id: Uuid, at: OffsetDateTime) -> Result<(), StoreError>;
    /// Most recent logins first, then by name.
    async fn list_recent(&self, limit: i64) -> Result<Vec<User>, StoreError>;
    /// Removes the user and all of their meals.
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait MealStore: Send + Sync {
    async fn insert_meal(&self, meal: &MealEntry) -> Result<(), StoreError>;
    /// Meals with `from <= timestamp < to`, newest first.
    async fn meals_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<MealEntry>, StoreError>;
    async fn recent_meals(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MealEntry>, StoreError>;
    /// Only deletes meals owned by `user_id`. Returns whether a row went away.
    async fn delete_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<bool, StoreError>;
}

/// Postgres-backed store. Queries live in `users::repo` and `meals::repo`.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}
