//! Meal plans: creation, storage and the normalized plan view.

pub mod dto;
pub mod fallback;
pub mod generator;
mod handlers;
mod repo;
pub mod schedule;
mod services;

use axum::Router;

use crate::state::AppState;

pub use dto::{CreatePlanRequest, MealPlan, NewMealPlan, PlanDetail, PlanView};
pub use schedule::{normalize, DayHistoryRecord, MealEntry, Normalized, NormalizedSchedule, Weekday};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
