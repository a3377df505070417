use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreatePlanRequest, MealPlan, Pagination, PlanDetailResponse, PlanView},
    repo, services,
};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mealplan", post(create_plan))
        .route("/mealplans", get(list_plans))
        .route("/mealplan/:id", get(get_plan))
        .route("/mealplan/:id/view", get(get_plan_view))
}

#[instrument(skip(state, payload))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Json(payload): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<MealPlan>), AppError> {
    let plan = services::create_plan(&state, owner_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealPlan>>, AppError> {
    let limit = p.limit.clamp(1, 100);
    let offset = p.offset.max(0);
    Ok(Json(repo::list_by_owner(&state.db, owner_id, limit, offset).await?))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<PlanDetailResponse>, AppError> {
    Ok(Json(services::load_detail(&state, owner_id, plan_id).await?))
}

#[instrument(skip(state))]
pub async fn get_plan_view(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Path(plan_id): Path<Uuid>,
) -> Result<Json<PlanView>, AppError> {
    Ok(Json(services::plan_view(&state, owner_id, plan_id).await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt as _;

    use crate::{app::build_app, auth::test_support::bearer_for, state::AppState};

    async fn create(body: Value) -> (StatusCode, Value) {
        let state = AppState::fake();
        let req = Request::post("/api/v1/mealplan")
            .header(header::AUTHORIZATION, bearer_for(&state))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = build_app(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn invalid_calories_rejected_before_storage() {
        for calories in [json!(0), json!(-200), json!(1800.5), json!("lots"), json!(3_000_000_000u64), Value::Null] {
            let (status, body) = create(json!({
                "goal": "fat-loss", "diet_type": "balanced", "daily_calories": calories
            }))
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "calories = {calories}");
            assert!(body["detail"].as_str().unwrap().starts_with("daily_calories"));
        }
    }

    #[tokio::test]
    async fn missing_goal_is_reported() {
        let (status, body) = create(json!({ "diet_type": "balanced", "daily_calories": 2000 })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "goal: is required");
    }

    #[tokio::test]
    async fn out_of_range_meal_count_is_reported() {
        let (status, body) = create(json!({
            "goal": "maintenance", "diet_type": "balanced", "daily_calories": 2000, "meals_per_day": 2
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "meals_per_day: must be between 3 and 6");
    }
}
