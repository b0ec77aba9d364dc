use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse},
        jwt::JwtKeys,
    },
    state::AppState,
    storage::StoreError,
    users::repo_types::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Name-only login: an unknown name creates the user, a known one reuses it.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let name = payload.name.trim();
    if name.is_empty() {
        warn!("login with empty name");
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
    }

    let now = OffsetDateTime::now_utc();
    let existing = state.users.find_by_name(name).await.map_err(|e| {
        error!(error = %e, "find_by_name failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let (mut user, created) = match existing {
        Some(user) => (user, false),
        None => {
            let user = User::new(name, now);
            match state.users.create_user(&user).await {
                Ok(()) => (user, true),
                // a concurrent login won the insert; use its row
                Err(StoreError::Conflict(_)) => match state.users.find_by_name(name).await {
                    Ok(Some(u)) => (u, false),
                    Ok(None) => {
                        error!(name = %name, "user vanished after name conflict");
                        return Err((
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Could not create user".into(),
                        ));
                    }
                    Err(e) => {
                        error!(error = %e, name = %name, "find_by_name after conflict failed");
                        return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
                    }
                },
                Err(e) => {
                    error!(error = %e, name = %name, "create user failed");
                    return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
                }
            }
        }
    };

    if !created {
        if let Err(e) = state.users.touch_login(user.id, now).await {
            error!(error = %e, user_id = %user.id, "touch_login failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
        user.last_login_at = Some(now);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(user_id = %user.id, created, "user logged in");
    Ok(Json(LoginResponse { token, user, created }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, UserStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    /// Delegates to a memory store, but lets another login win the insert.
    struct RacingStore {
        inner: MemoryStore,
        lookup_missed: AtomicBool,
        create_fails: bool,
    }

    #[async_trait]
    impl UserStore for RacingStore {
        async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            self.inner.get_user(id).await
        }
        async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
            if !self.lookup_missed.swap(true, Ordering::SeqCst) {
                return Ok(None);
            }
            self.inner.find_by_name(name).await
        }
        async fn create_user(&self, user: &User) -> Result<(), StoreError> {
            if self.create_fails {
                return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
            }
            let winner = User::new(user.name.clone(), user.created_at);
            self.inner.create_user(&winner).await?;
            self.inner.create_user(user).await
        }
        async fn save_user(&self, user: &User) -> Result<(), StoreError> {
            self.inner.save_user(user).await
        }
        async fn touch_login(&self, id: Uuid, at: OffsetDateTime) -> Result<(), StoreError> {
            self.inner.touch_login(id, at).await
        }
        async fn list_recent(&self, limit: i64) -> Result<Vec<User>, StoreError> {
            self.inner.list_recent(limit).await
        }
        async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
            self.inner.delete_user(id).await
        }
    }

    fn state_with(create_fails: bool) -> (AppState, MemoryStore) {
        let inner = MemoryStore::new();
        let users = RacingStore {
            inner: inner.clone(),
            lookup_missed: AtomicBool::new(false),
            create_fails,
        };
        let state = AppState::from_parts(
            AppState::fake().config,
            Arc::new(users),
            Arc::new(inner.clone()),
        );
        (state, inner)
    }

    #[tokio::test]
    async fn lost_insert_race_reuses_winner() {
        let (state, inner) = state_with(false);
        let Json(res) = login(State(state), Json(LoginRequest { name: "Alex".into() }))
            .await
            .unwrap();
        assert!(!res.created);
        let stored = inner.find_by_name("Alex").await.unwrap().unwrap();
        assert_eq!(res.user.id, stored.id);
        assert_eq!(inner.list_recent(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn database_failure_is_not_treated_as_race() {
        let (state, inner) = state_with(true);
        let (status, _) = login(State(state), Json(LoginRequest { name: "Alex".into() }))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(inner.find_by_name("Alex").await.unwrap().is_none());
    }
}
