use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Anything other than a male label uses the female formula.
    pub fn parse_lenient(label: Option<&str>) -> Self {
        match label.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("male" | "m" | "man") => Sex::Male,
            _ => Sex::Female,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    #[default]
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Low => 1.2,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::High => 1.9,
        }
    }

    /// Unknown labels count as low activity.
    pub fn parse_lenient(label: Option<&str>) -> Self {
        match label.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("moderate") => ActivityLevel::Moderate,
            Some("high") => ActivityLevel::High,
            _ => ActivityLevel::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
}

impl BodyMetrics {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(ValidationError::new("weight_kg", "must be positive"));
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(ValidationError::new("height_cm", "must be positive"));
        }
        if self.age == 0 {
            return Err(ValidationError::new("age", "must be positive"));
        }
        Ok(())
    }

    /// Mifflin-St Jeor basal metabolic rate in kcal.
    pub fn bmr(&self) -> f64 {
        let base = 10.0 * self.weight_kg + 6.25 * self.height_cm - 5.0 * f64::from(self.age);
        match self.sex {
            Sex::Male => base + 5.0,
            Sex::Female => base - 161.0,
        }
    }
}

/// Calorie delta for a goal label: cutting -500, bulking +300.
pub fn goal_adjustment(goal: &str) -> f64 {
    match goal.trim().to_ascii_lowercase().as_str() {
        "cut" | "fat-loss" | "fat_loss" => -500.0,
        "bulk" | "muscle-gain" | "muscle_gain" => 300.0,
        _ => 0.0,
    }
}

/// Daily calorie target from body metrics, activity and goal.
pub fn estimate_daily_calories(
    metrics: &BodyMetrics,
    activity: ActivityLevel,
    goal: &str,
) -> Result<i64, ValidationError> {
    metrics.validate()?;
    let kcal = (metrics.bmr() * activity.multiplier() + goal_adjustment(goal)).round() as i64;
    if kcal <= 0 {
        return Err(ValidationError::new(
            "daily_calories",
            "estimate is not positive for these metrics",
        ));
    }
    Ok(kcal)
}
