use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::repo_types::{MealEntry, MealRow};
use crate::storage::{MealStore, PgStore, StoreError};
use crate::users::repo_types::to_int_column;

#[async_trait]
impl MealStore for PgStore {
    async fn insert_meal(&self, meal: &MealEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO meals (id, user_id, eaten_at, name, carbs_g, protein_g, fat_g)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(meal.id)
        .bind(meal.user_id)
        .bind(meal.timestamp)
        .bind(meal.name.as_deref())
        .bind(to_int_column("carbs_g", meal.macros.carbs)?)
        .bind(to_int_column("protein_g", meal.macros.protein)?)
        .bind(to_int_column("fat_g", meal.macros.fat)?)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn meals_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<MealEntry>, StoreError> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, user_id, eaten_at, name, carbs_g, protein_g, fat_g
              FROM meals
             WHERE user_id = $1 AND eaten_at >= $2 AND eaten_at < $3
             ORDER BY eaten_at DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(MealEntry::try_from).collect()
    }

    async fn recent_meals(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MealEntry>, StoreError> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, user_id, eaten_at, name, carbs_g, protein_g, fat_g
              FROM meals
             WHERE user_id = $1
             ORDER BY eaten_at DESC
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(MealEntry::try_from).collect()
    }

    async fn delete_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(meal_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
