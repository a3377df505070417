use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreatePlanRequest, MealPlan, PlanDetailResponse, PlanView},
    fallback, generator, repo,
    schedule::{normalize, DayHistoryRecord},
};
use crate::{clients, error::AppError, state::AppState};

fn plan_not_found() -> AppError {
    AppError::NotFound("Meal plan not found".into())
}

/// Validates, derives macros, generates the week and stores everything.
pub async fn create_plan(
    state: &AppState,
    owner_id: Uuid,
    request: &CreatePlanRequest,
) -> Result<MealPlan, AppError> {
    let plan = request.validate()?;

    if let Some(client_id) = plan.client_id {
        if clients::repo::find(&state.db, owner_id, client_id).await?.is_none() {
            warn!(%client_id, %owner_id, "plan requested for unknown client");
            return Err(AppError::NotFound("Client not found".into()));
        }
    }

    let week = generator::generate_week(plan.daily_calories, plan.macros, plan.meals_per_day);
    let created = repo::insert_plan_with_days(&state.db, owner_id, &plan, &week).await?;

    info!(
        plan_id = %created.id,
        %owner_id,
        daily_calories = plan.daily_calories,
        meals_per_day = plan.meals_per_day,
        "meal plan created"
    );
    Ok(created)
}

pub async fn load_detail(state: &AppState, owner_id: Uuid, plan_id: Uuid) -> Result<PlanDetailResponse, AppError> {
    let mealplan = repo::find_plan(&state.db, owner_id, plan_id)
        .await?
        .ok_or_else(plan_not_found)?;
    let history = repo::list_days(&state.db, plan_id).await?;
    Ok(PlanDetailResponse { mealplan, history })
}

/// Plan detail run through normalization and fallback resolution.
pub async fn plan_view(state: &AppState, owner_id: Uuid, plan_id: Uuid) -> Result<PlanView, AppError> {
    let detail = load_detail(state, owner_id, plan_id).await?;
    let records: Vec<DayHistoryRecord> = detail.history.iter().map(DayHistoryRecord::from).collect();
    let normalized = normalize(&records);
    if !normalized.diagnostics.is_empty() {
        warn!(%plan_id, broken_days = normalized.diagnostics.len(), "plan has undecodable days");
    }
    Ok(fallback::resolve(Some(detail.mealplan), normalized))
}
