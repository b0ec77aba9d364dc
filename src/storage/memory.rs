//! In-process store used by tests and when no `DATABASE_URL` is given.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MealStore, StoreError, UserStore};
use crate::meals::repo_types::MealEntry;
use crate::users::repo_types::User;

#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    meals: Arc<RwLock<HashMap<Uuid, MealEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page(limit: i64, offset: i64) -> (usize, usize) {
    (
        usize::try_from(limit.max(0)).unwrap_or(usize::MAX),
        usize::try_from(offset.max(0)).unwrap_or(usize::MAX),
    )
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.name == name).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.name == user.name) || users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user name {}", user.name)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.id).ok_or(StoreError::NotFound)?;
        stored.weight = user.weight;
        stored.goal = user.goal;
        Ok(())
    }

    async fn touch_login(&self, id: Uuid, at: OffsetDateTime) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.last_login_at = Some(at);
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<User>, StoreError> {
        let (limit, _) = page(limit, 0);
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        // None sorts last, like NULLS LAST
        users.sort_by(|a, b| {
            b.last_login_at
                .cmp(&a.last_login_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        users.truncate(limit);
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        // lock order is users then meals, same as insert_meal
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();
        if removed {
            self.meals.write().await.retain(|_, m| m.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn insert_meal(&self, meal: &MealEntry) -> Result<(), StoreError> {
        // held until the insert so delete_user cannot run in between
        let users = self.users.read().await;
        if !users.contains_key(&meal.user_id) {
            return Err(StoreError::NotFound);
        }
        self.meals.write().await.insert(meal.id, meal.clone());
        Ok(())
    }

    async fn meals_between(
        &self,
        user_id: Uuid,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<MealEntry>, StoreError> {
        let mut out: Vec<MealEntry> = self
            .meals
            .read()
            .await
            .values()
            .filter(|m| m.user_id == user_id && m.timestamp >= from && m.timestamp < to)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    async fn recent_meals(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MealEntry>, StoreError> {
        let (limit, offset) = page(limit, offset);
        let mut out: Vec<MealEntry> = self
            .meals
            .read()
            .await
            .values()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out.into_iter().skip(offset).take(limit).collect())
    }

    async fn delete_meal(&self, user_id: Uuid, meal_id: Uuid) -> Result<bool, StoreError> {
        let mut meals = self.meals.write().await;
        match meals.get(&meal_id) {
            Some(m) if m.user_id == user_id => {
                meals.remove(&meal_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::{DailyGoal, Macros};
    use time::macros::datetime;

    async fn store_with_user(name: &str) -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = User::new(name, datetime!(2025-08-24 8:00 UTC));
        store.create_user(&user).await.unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn find_by_name_is_exact() {
        let (store, user) = store_with_user("Alex Chen").await;
        let found = store.find_by_name("Alex Chen").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(store.find_by_name("alex chen").await.unwrap().is_none());
        assert!(store.find_by_name("Alex").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let (store, _) = store_with_user("Alex Chen").await;
        let again = User::new("Alex Chen", datetime!(2025-08-24 9:00 UTC));
        assert!(matches!(store.create_user(&again).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn recent_users_order() {
        let store = MemoryStore::new();
        let mut a = User::new("b-user", datetime!(2025-08-24 8:00 UTC));
        a.last_login_at = None;
        let b = User::new("a-user", datetime!(2025-08-24 8:00 UTC));
        let c = User::new("c-user", datetime!(2025-08-24 10:00 UTC));
        for u in [&a, &b, &c] {
            store.create_user(u).await.unwrap();
        }
        let names: Vec<String> =
            store.list_recent(10).await.unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["c-user", "a-user", "b-user"]);
        assert_eq!(store.list_recent(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn meals_between_is_half_open() {
        let (store, user) = store_with_user("Alex Chen").await;
        let from = datetime!(2025-08-24 0:00 UTC);
        let to = datetime!(2025-08-25 0:00 UTC);
        for ts in [from, datetime!(2025-08-24 12:00 UTC), to] {
            let meal = MealEntry::new(user.id, ts, None, Macros::new(1, 1, 1));
            store.insert_meal(&meal).await.unwrap();
        }
        let day = store.meals_between(user.id, from, to).await.unwrap();
        assert_eq!(day.len(), 2);
        assert!(day[0].timestamp > day[1].timestamp);
    }

    #[tokio::test]
    async fn delete_meal_checks_owner() {
        let (store, user) = store_with_user("Alex Chen").await;
        let meal = MealEntry::new(user.id, datetime!(2025-08-24 12:00 UTC), None, Macros::default());
        store.insert_meal(&meal).await.unwrap();
        assert!(!store.delete_meal(Uuid::new_v4(), meal.id).await.unwrap());
        assert!(store.delete_meal(user.id, meal.id).await.unwrap());
        assert!(!store.delete_meal(user.id, meal.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_user_cascades() {
        let (store, user) = store_with_user("Alex Chen").await;
        let meal = MealEntry::new(user.id, datetime!(2025-08-24 12:00 UTC), None, Macros::default());
        store.insert_meal(&meal).await.unwrap();
        assert!(store.delete_user(user.id).await.unwrap());
        assert!(store.get_user(user.id).await.unwrap().is_none());
        let left = store.recent_meals(user.id, 10, 0).await.unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn no_meal_outlives_its_user() {
        for _ in 0..50 {
            let (store, user) = store_with_user("Alex Chen").await;
            let inserts: Vec<_> = (0..4)
                .map(|_| {
                    let store = store.clone();
                    let meal = MealEntry::new(
                        user.id,
                        datetime!(2025-08-24 12:00 UTC),
                        None,
                        Macros::new(1, 1, 1),
                    );
                    tokio::spawn(async move { store.insert_meal(&meal).await })
                })
                .collect();
            let delete = {
                let store = store.clone();
                tokio::spawn(async move { store.delete_user(user.id).await })
            };
            for handle in inserts {
                let _ = handle.await.unwrap();
            }
            assert!(delete.await.unwrap().unwrap());
            let left = store.recent_meals(user.id, 100, 0).await.unwrap();
            assert!(left.is_empty());
        }
    }

    #[tokio::test]
    async fn save_user_updates_goal_only_for_known_user() {
        let (store, mut user) = store_with_user("Alex Chen").await;
        user.goal = crate::nutrition::goal_from_weight(70.0);
        store.save_user(&user).await.unwrap();
        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert_ne!(stored.goal, DailyGoal::placeholder());

        let stranger = User::new("nobody", datetime!(2025-08-24 8:00 UTC));
        assert!(matches!(store.save_user(&stranger).await, Err(StoreError::NotFound)));
    }
}
