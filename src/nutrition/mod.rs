//! Calorie targets and macro splits.

pub mod allocator;
mod dto;
pub mod energy;
mod handlers;

use axum::Router;

use crate::state::AppState;

pub use allocator::{allocate, daily_calories_from_json, MacroGrams, MacroOverrides};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
