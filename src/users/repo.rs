use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::storage::{PgStore, StoreError, UserStore};
use crate::users::repo_types::{to_int_column, User, UserRow};

const USER_COLUMNS: &str = "id, name, weight_kg, daily_calorie_goal, daily_carbs_goal, \
     daily_protein_goal, daily_fat_goal, last_login_at, created_at";

fn goal_columns(user: &User) -> Result<[i32; 4], StoreError> {
    Ok([
        to_int_column("daily_calorie_goal", user.goal.calories())?,
        to_int_column("daily_carbs_goal", user.goal.carbs())?,
        to_int_column("daily_protein_goal", user.goal.protein())?,
        to_int_column("daily_fat_goal", user.goal.fat())?,
    ])
}

#[async_trait]
impl UserStore for PgStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let [calories, carbs, protein, fat] = goal_columns(user)?;
        sqlx::query(
            r#"
            INSERT INTO users (id, name, weight_kg, daily_calorie_goal, daily_carbs_goal,
                               daily_protein_goal, daily_fat_goal, last_login_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(user.weight.kg())
        .bind(calories)
        .bind(carbs)
        .bind(protein)
        .bind(fat)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .execute(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("user name {}", user.name))
            }
            other => StoreError::Database(other),
        })?;
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let [calories, carbs, protein, fat] = goal_columns(user)?;
        let res = sqlx::query(
            r#"
            UPDATE users
               SET weight_kg = $2,
                   daily_calorie_goal = $3,
                   daily_carbs_goal = $4,
                   daily_protein_goal = $5,
                   daily_fat_goal = $6
             WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(user.weight.kg())
        .bind(calories)
        .bind(carbs)
        .bind(protein)
        .bind(fat)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn touch_login(&self, id: Uuid, at: OffsetDateTime) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             ORDER BY last_login_at DESC NULLS LAST, name ASC \
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        // meals go with it via ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
