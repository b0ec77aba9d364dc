use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    meals::repo_types::MealEntry,
    nutrition::{aggregate, day_window, summarize, Macros},
    state::AppState,
    users::handlers::{current_user, internal, write_failure},
};

use super::dto::{
    format_day, parse_day, CreateMealRequest, DayMealsResponse, DayQuery, MealView, Pagination,
    SummaryQuery, SummaryResponse,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_day_meals).post(create_meal))
        .route("/meals/recent", get(list_recent_meals))
        .route("/meals/:id", delete(delete_meal))
}

pub fn summary_routes() -> Router<AppState> {
    Router::new().route("/summary", get(daily_summary))
}

fn bad_date() -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, "date must be YYYY-MM-DD".into())
}

/// Parse `?date=` into a day that has a full window in the configured
/// offset.
fn requested_day(state: &AppState, raw: Option<&str>) -> Result<Date, (StatusCode, String)> {
    let day = parse_day(raw, state.config.utc_offset).map_err(|e| {
        warn!(date = ?raw, error = %e, "invalid date");
        bad_date()
    })?;
    if day_window(day, state.config.utc_offset).is_none() {
        warn!(date = ?raw, "date has no following day");
        return Err(bad_date());
    }
    Ok(day)
}

async fn meals_of_day(
    state: &AppState,
    user_id: Uuid,
    day: Date,
) -> Result<Vec<MealEntry>, (StatusCode, String)> {
    let (from, to) = day_window(day, state.config.utc_offset).ok_or_else(bad_date)?;
    state
        .meals
        .meals_between(user_id, from, to)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "meals_between failed");
            internal(e)
        })
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealView>), (StatusCode, String)> {
    payload.validate().map_err(|e| {
        warn!(%user_id, error = %e, "meal rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;
    let user = current_user(&state, user_id).await?;
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let meal = MealEntry::new(
        user.id,
        payload.timestamp.unwrap_or_else(OffsetDateTime::now_utc),
        name,
        Macros::new(payload.carbs, payload.protein, payload.fat),
    );

    state.meals.insert_meal(&meal).await.map_err(|e| {
        error!(error = %e, %user_id, "insert_meal failed");
        write_failure(e)
    })?;
    info!(%user_id, meal_id = %meal.id, calories = meal.calories(), "meal logged");

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/meals/{}", meal.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(MealView::new(meal, &user.goal))))
}

#[instrument(skip(state))]
pub async fn list_day_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<DayMealsResponse>, (StatusCode, String)> {
    let user = current_user(&state, user_id).await?;
    let day = requested_day(&state, q.date.as_deref())?;
    let meals = meals_of_day(&state, user_id, day).await?;
    let totals = aggregate(&meals);
    Ok(Json(DayMealsResponse {
        date: format_day(day),
        meals: meals.into_iter().map(|m| MealView::new(m, &user.goal)).collect(),
        totals,
    }))
}

#[instrument(skip(state))]
pub async fn list_recent_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealView>>, (StatusCode, String)> {
    let user = current_user(&state, user_id).await?;
    let meals = state
        .meals
        .recent_meals(user_id, p.limit.clamp(1, 100), p.offset.max(0))
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, "recent_meals failed");
            internal(e)
        })?;
    Ok(Json(
        meals.into_iter().map(|m| MealView::new(m, &user.goal)).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let removed = state.meals.delete_meal(user_id, id).await.map_err(|e| {
        error!(error = %e, %user_id, %id, "delete_meal failed");
        internal(e)
    })?;
    if !removed {
        return Err((StatusCode::NOT_FOUND, "Meal not found".into()));
    }
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn daily_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, (StatusCode, String)> {
    let user = current_user(&state, user_id).await?;
    let day = requested_day(&state, q.date.as_deref())?;
    let meals = meals_of_day(&state, user_id, day).await?;
    let intake = aggregate(&meals);
    let summary = summarize(&user.goal, &intake, q.burned);
    debug!(%user_id, %day, meals = meals.len(), "summary computed");
    Ok(Json(SummaryResponse {
        date: format_day(day),
        meal_count: meals.len(),
        goal: user.goal,
        intake,
        summary,
    }))
}
