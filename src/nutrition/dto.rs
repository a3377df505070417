use serde::{Deserialize, Serialize};

use super::allocator::MacroGrams;

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    #[serde(default, alias = "gender")]
    pub sex: Option<String>,
    pub activity_level: Option<String>,
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub bmr: f64,
    pub daily_calories: i64,
    pub macros: MacroGrams,
}
