use axum::{routing::post, Json, Router};
use tracing::{info, instrument};

use super::{
    allocator::{allocate, MacroOverrides},
    dto::{EstimateRequest, EstimateResponse},
    energy::{estimate_daily_calories, ActivityLevel, BodyMetrics, Sex},
};
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/macros/estimate", post(estimate))
}

#[instrument(skip(payload))]
pub async fn estimate(
    AuthUser(coach_id): AuthUser,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, AppError> {
    let metrics = BodyMetrics {
        weight_kg: payload.weight_kg,
        height_cm: payload.height_cm,
        age: payload.age,
        sex: Sex::parse_lenient(payload.sex.as_deref()),
    };
    let activity = ActivityLevel::parse_lenient(payload.activity_level.as_deref());
    let daily_calories = estimate_daily_calories(&metrics, activity, &payload.goal)?;
    let macros = allocate(daily_calories, MacroOverrides::default())?;

    info!(%coach_id, daily_calories, ?activity, "calorie target estimated");
    Ok(Json(EstimateResponse {
        bmr: metrics.bmr(),
        daily_calories,
        macros,
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt as _;

    use crate::{app::build_app, auth::test_support::bearer_for, state::AppState};

    async fn post_estimate(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let state = AppState::fake();
        let req = Request::post("/api/v1/macros/estimate")
            .header(header::AUTHORIZATION, bearer_for(&state))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = build_app(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn estimate_returns_target_and_split() {
        let (status, body) = post_estimate(serde_json::json!({
            "weight_kg": 80.0, "height_cm": 180.0, "age": 30,
            "gender": "male", "activity_level": "moderate", "goal": "cut"
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["daily_calories"], 2259);
        assert_eq!(body["macros"]["carbs"], 226);
    }

    #[tokio::test]
    async fn unrecognised_gender_uses_female_formula() {
        let (status, body) = post_estimate(serde_json::json!({
            "weight_kg": 80.0, "height_cm": 180.0, "age": 30, "gender": "other"
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bmr"], 1614.0);
        assert_eq!(body["daily_calories"], 1937);
    }

    #[tokio::test]
    async fn estimate_rejects_zero_weight() {
        let (status, body) = post_estimate(serde_json::json!({
            "weight_kg": 0.0, "height_cm": 180.0, "age": 30, "sex": "female"
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().starts_with("weight_kg"));
    }
}
