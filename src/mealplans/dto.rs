use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::schedule::{DayDiagnostic, DayHistoryRecord, NormalizedSchedule};
use crate::{
    error::ValidationError,
    nutrition::{
        allocate, allocator::positive_calories, daily_calories_from_json, MacroGrams,
        MacroOverrides,
    },
};

pub const MEALS_PER_DAY: std::ops::RangeInclusive<u8> = 3..=6;
const DEFAULT_MEALS_PER_DAY: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealPlan {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub goal: String,
    pub diet_type: String,
    pub daily_calories: i32,
    pub macro_protein: i32,
    pub macro_carbs: i32,
    pub macro_fats: i32,
    #[serde(default = "default_meals_per_day")]
    pub meals_per_day: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

fn default_meals_per_day() -> i32 {
    i32::from(DEFAULT_MEALS_PER_DAY)
}

impl MealPlan {
    /// Plan macros as grams; negative stored values read as zero.
    pub fn macro_grams(&self) -> MacroGrams {
        let grams = |v: i32| u32::try_from(v).unwrap_or(0);
        MacroGrams {
            protein: grams(self.macro_protein),
            carbs: grams(self.macro_carbs),
            fats: grams(self.macro_fats),
        }
    }
}

/// Stored day row, serialized as part of the plan detail.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DayHistoryRow {
    pub id: Uuid,
    pub day_number: i32,
    pub meals_json: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&DayHistoryRow> for DayHistoryRecord {
    fn from(r: &DayHistoryRow) -> Self {
        Self {
            day_number: i64::from(r.day_number),
            meals_json: r.meals_json.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    pub mealplan: MealPlan,
    pub history: Vec<DayHistoryRow>,
}

/// Plan detail as read by the dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDetail {
    pub mealplan: MealPlan,
    #[serde(default)]
    pub history: Vec<DayHistoryRecord>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MacroInput {
    pub protein: Option<i64>,
    pub carbs: Option<i64>,
    pub fats: Option<i64>,
}

/// Plan creation form. Everything is optional on the wire so that missing
/// and malformed fields surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePlanRequest {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default, alias = "dietType")]
    pub diet_type: Option<String>,
    #[serde(default, alias = "dailyCalories", alias = "calories")]
    pub daily_calories: Option<Value>,
    #[serde(default, alias = "mealsPerDay")]
    pub meals_per_day: Option<Value>,
    #[serde(default, alias = "clientId")]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub macros: Option<MacroInput>,
}

/// A validated plan with every macro filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMealPlan {
    pub goal: String,
    pub diet_type: String,
    pub daily_calories: u32,
    pub meals_per_day: u8,
    pub client_id: Option<Uuid>,
    pub macros: MacroGrams,
}

fn required_text(field: &'static str, value: Option<&str>) -> Result<String, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::new(field, "is required")),
    }
}

fn grams(field: &'static str, value: Option<i64>) -> Result<Option<u32>, ValidationError> {
    value
        .map(|g| u32::try_from(g).map_err(|_| ValidationError::new(field, "must be zero or more grams")))
        .transpose()
}

fn meals_per_day(value: Option<&Value>) -> Result<u8, ValidationError> {
    let n = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_MEALS_PER_DAY),
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    n.and_then(|n| u8::try_from(n).ok())
        .filter(|n| MEALS_PER_DAY.contains(n))
        .ok_or_else(|| ValidationError::new("meals_per_day", "must be between 3 and 6"))
}

impl CreatePlanRequest {
    /// Checks required fields and derives missing macros. Pure; nothing here
    /// touches the network or the database.
    pub fn validate(&self) -> Result<NewMealPlan, ValidationError> {
        let daily_calories = daily_calories_from_json(self.daily_calories.as_ref())?;
        let goal = required_text("goal", self.goal.as_deref())?;
        let diet_type = required_text("diet_type", self.diet_type.as_deref())?;
        let meals_per_day = meals_per_day(self.meals_per_day.as_ref())?;

        let input = self.macros.unwrap_or_default();
        let overrides = MacroOverrides {
            protein: grams("macros.protein", input.protein)?,
            carbs: grams("macros.carbs", input.carbs)?,
            fats: grams("macros.fats", input.fats)?,
        };
        let macros = allocate(daily_calories, overrides)?;

        Ok(NewMealPlan {
            goal,
            diet_type,
            daily_calories: positive_calories(daily_calories)?,
            meals_per_day,
            client_id: self.client_id,
            macros,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// One bar of the weekly chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: &'static str,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

/// Which parts of a [`PlanView`] were substituted with example data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FallbackUsage {
    pub macros: bool,
    pub weekly: bool,
    pub schedule: bool,
}

/// Everything the plan screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanView {
    pub plan: Option<MealPlan>,
    pub macros: MacroGrams,
    pub weekly: Vec<DaySummary>,
    pub schedule: NormalizedSchedule,
    pub diagnostics: Vec<DayDiagnostic>,
    pub fallback: FallbackUsage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> CreatePlanRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn derives_macros_when_omitted() {
        let plan = request(json!({
            "goal": "muscle-gain", "dietType": "balanced", "dailyCalories": 2500
        }))
        .validate()
        .unwrap();
        assert_eq!(plan.macros, MacroGrams { protein: 188, carbs: 250, fats: 83 });
        assert_eq!(plan.meals_per_day, 3);
    }

    #[test]
    fn keeps_supplied_macros() {
        let plan = request(json!({
            "goal": "cut", "diet_type": "keto", "daily_calories": "1800",
            "meals_per_day": "5", "macros": { "protein": 160, "carbs": 30 }
        }))
        .validate()
        .unwrap();
        assert_eq!(plan.macros.protein, 160);
        assert_eq!(plan.macros.carbs, 30);
        assert_eq!(plan.macros.fats, 60);
        assert_eq!(plan.meals_per_day, 5);
    }

    #[test]
    fn rejects_bad_input() {
        let cases = [
            (json!({ "goal": "cut", "diet_type": "keto" }), "daily_calories"),
            (json!({ "goal": "cut", "diet_type": "keto", "daily_calories": -1 }), "daily_calories"),
            (json!({ "goal": "cut", "diet_type": "keto", "daily_calories": "abc" }), "daily_calories"),
            (json!({ "goal": "cut", "diet_type": "keto", "daily_calories": 3_000_000_000u64 }), "daily_calories"),
            (json!({ "goal": " ", "diet_type": "keto", "daily_calories": 2000 }), "goal"),
            (json!({ "goal": "cut", "daily_calories": 2000 }), "diet_type"),
            (json!({ "goal": "cut", "diet_type": "keto", "daily_calories": 2000, "meals_per_day": 7 }), "meals_per_day"),
            (json!({ "goal": "cut", "diet_type": "keto", "daily_calories": 2000, "macros": { "fats": -3 } }), "macros.fats"),
        ];
        for (body, field) in cases {
            assert_eq!(request(body).validate().unwrap_err().field, field);
        }
    }

    #[test]
    fn validated_plan_round_trips_through_the_wire_form() {
        let plan = request(json!({ "goal": "maintenance", "diet_type": "vegan", "daily_calories": 2200 }))
            .validate()
            .unwrap();
        let again = request(serde_json::to_value(&plan).unwrap()).validate().unwrap();
        assert_eq!(plan, again);
    }
}
