//! Macro gram allocation from a daily calorie target.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Share of daily calories and energy density for one macro.
#[derive(Debug, Clone, Copy)]
struct MacroShare {
    percent: u64,
    kcal_per_gram: u64,
}

impl MacroShare {
    /// Nearest whole gram, halves rounded up.
    fn grams(self, daily_calories: u32) -> u32 {
        let divisor = 100 * self.kcal_per_gram;
        ((u64::from(daily_calories) * self.percent + divisor / 2) / divisor) as u32
    }
}

const PROTEIN: MacroShare = MacroShare { percent: 30, kcal_per_gram: 4 };
const CARBS: MacroShare = MacroShare { percent: 40, kcal_per_gram: 4 };
const FATS: MacroShare = MacroShare { percent: 30, kcal_per_gram: 9 };

/// Protein, carbs and fats in whole grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroGrams {
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

impl MacroGrams {
    pub fn kcal(&self) -> u64 {
        u64::from(self.protein) * 4 + u64::from(self.carbs) * 4 + u64::from(self.fats) * 9
    }

    pub fn is_zero(&self) -> bool {
        self.protein == 0 && self.carbs == 0 && self.fats == 0
    }
}

/// Macros supplied by the caller; `None` means derive it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroOverrides {
    pub protein: Option<u32>,
    pub carbs: Option<u32>,
    pub fats: Option<u32>,
}

/// Fills in every macro the caller left out using a 30/40/30 calorie split.
/// Supplied values pass through untouched.
pub fn allocate(daily_calories: i64, overrides: MacroOverrides) -> Result<MacroGrams, ValidationError> {
    let kcal = positive_calories(daily_calories)?;
    Ok(MacroGrams {
        protein: overrides.protein.unwrap_or_else(|| PROTEIN.grams(kcal)),
        carbs: overrides.carbs.unwrap_or_else(|| CARBS.grams(kcal)),
        fats: overrides.fats.unwrap_or_else(|| FATS.grams(kcal)),
    })
}

/// Upper bound for a daily target. Well inside the `INTEGER` plan column.
pub const MAX_DAILY_CALORIES: u32 = 20_000;

pub(crate) fn positive_calories(daily_calories: i64) -> Result<u32, ValidationError> {
    if daily_calories <= 0 {
        return Err(ValidationError::new(
            "daily_calories",
            "must be a positive whole number",
        ));
    }
    u32::try_from(daily_calories)
        .ok()
        .filter(|kcal| *kcal <= MAX_DAILY_CALORIES)
        .ok_or_else(|| {
            ValidationError::new("daily_calories", format!("must be at most {MAX_DAILY_CALORIES}"))
        })
}

/// Reads a calorie target from loosely typed input: JSON integers and
/// digit strings are accepted, anything else is rejected.
pub fn daily_calories_from_json(value: Option<&Value>) -> Result<i64, ValidationError> {
    let parsed = match value {
        None | Some(Value::Null) => {
            return Err(ValidationError::new("daily_calories", "is required"));
        }
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    let kcal = parsed.ok_or_else(|| ValidationError::new("daily_calories", "must be a whole number"))?;
    positive_calories(kcal)?;
    Ok(kcal)
}
