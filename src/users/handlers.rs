use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    nutrition::{
        goal_from_macros, goal_from_weight, parse_weight, recommend::check_macros_in_range,
        recommendations, units::total_calories_rounded,
    },
    state::AppState,
    storage::StoreError,
    users::{
        dto::{
            GoalPreviewQuery, GoalPreviewResponse, GoalResponse, ProfileResponse, RecentQuery,
            RecentUser, RecommendationQuery, RecommendationResponse, RecommendationsView,
            SetGoalRequest, SetWeightRequest,
        },
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users/recent", get(recent_users))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).delete(delete_me))
        .route("/me/weight", put(set_weight))
        .route("/me/goal", put(set_goal))
        .route("/me/goal/preview", get(preview_goal))
        .route("/me/recommendations", get(get_recommendations))
}

pub(crate) fn internal(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::NotFound => (StatusCode::NOT_FOUND, "Not found".into()),
        StoreError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// Like [`internal`], but a record the store refuses to write is the
/// client's fault.
pub(crate) fn write_failure(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::Invalid(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        other => internal(other),
    }
}

/// Load the session's user. A token for a deleted user is a 401.
pub(crate) async fn current_user(
    state: &AppState,
    user_id: Uuid,
) -> Result<User, (StatusCode, String)> {
    match state.users.get_user(user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            warn!(user_id = %user_id, "session user not found");
            Err((StatusCode::UNAUTHORIZED, "User not found".into()))
        }
        Err(e) => {
            error!(error = %e, user_id = %user_id, "get_user failed");
            Err(internal(e))
        }
    }
}

fn profile(user: User) -> ProfileResponse {
    let ranges = user.weight.kg().map(|kg| RecommendationsView::from(recommendations(kg)));
    ProfileResponse { user, recommendations: ranges }
}

#[instrument(skip(state))]
pub async fn recent_users(
    State(state): State<AppState>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<RecentUser>>, (StatusCode, String)> {
    let users = state
        .users
        .list_recent(q.limit.clamp(1, 100))
        .await
        .map_err(|e| {
            error!(error = %e, "list_recent failed");
            internal(e)
        })?;
    Ok(Json(users.into_iter().map(RecentUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let user = current_user(&state, user_id).await?;
    Ok(Json(profile(user)))
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = state.users.delete_user(user_id).await.map_err(|e| {
        error!(error = %e, user_id = %user_id, "delete_user failed");
        internal(e)
    })?;
    if !removed {
        return Err((StatusCode::NOT_FOUND, "User not found".into()));
    }
    info!(user_id = %user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn set_weight(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetWeightRequest>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let weight = payload.weight.validate().map_err(|e| {
        warn!(user_id = %user_id, input = ?payload.weight, "weight rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let mut user = current_user(&state, user_id).await?;
    user.weight = weight;
    if payload.apply_goal {
        if let Some(kg) = weight.kg() {
            user.goal = goal_from_weight(kg);
        }
    }

    state.users.save_user(&user).await.map_err(|e| {
        error!(error = %e, user_id = %user_id, "save_user failed");
        write_failure(e)
    })?;
    info!(user_id = %user_id, applied_goal = payload.apply_goal, "weight updated");
    Ok(Json(profile(user)))
}

#[instrument(skip(state))]
pub async fn set_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SetGoalRequest>,
) -> Result<Json<GoalResponse>, (StatusCode, String)> {
    payload.validate().map_err(|e| {
        warn!(user_id = %user_id, error = %e, "goal rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;
    let mut user = current_user(&state, user_id).await?;
    user.goal = goal_from_macros(payload.carbs, payload.protein, payload.fat);

    state.users.save_user(&user).await.map_err(|e| {
        error!(error = %e, user_id = %user_id, "save_user failed");
        write_failure(e)
    })?;

    let within_recommended = user
        .weight
        .kg()
        .map(|kg| check_macros_in_range(kg, payload.carbs, payload.protein, payload.fat));
    if let Some(check) = within_recommended {
        if !check.all_within() {
            info!(user_id = %user_id, ?check, "goal outside recommended range");
        }
    }
    Ok(Json(GoalResponse { user, within_recommended }))
}

/// Calorie readout while goal sliders move; nothing is stored.
#[instrument(skip(_user))]
pub async fn preview_goal(
    _user: AuthUser,
    Query(q): Query<GoalPreviewQuery>,
) -> Result<Json<GoalPreviewResponse>, (StatusCode, String)> {
    q.validate().map_err(|msg| (StatusCode::UNPROCESSABLE_ENTITY, msg))?;
    Ok(Json(GoalPreviewResponse {
        calories: total_calories_rounded(q.carbs, q.protein, q.fat),
    }))
}

#[instrument(skip(state))]
pub async fn get_recommendations(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, (StatusCode, String)> {
    let weight_kg = match q.weight.as_deref() {
        Some(raw) => {
            parse_weight(raw).map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?
        }
        None => {
            let user = current_user(&state, user_id).await?;
            user.weight.kg().ok_or((
                StatusCode::CONFLICT,
                "Set a weight first or pass ?weight=".to_string(),
            ))?
        }
    };
    Ok(Json(RecommendationResponse {
        weight_kg,
        recommendations: RecommendationsView::from(recommendations(weight_kg)),
    }))
}
