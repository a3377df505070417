//! Rebuilds a weekday-keyed meal schedule from per-day history records.
//!
//! Each record carries a day number and an opaque JSON payload written when
//! the plan was generated. Payloads are decoded one day at a time: a day that
//! fails to decode shows up as an empty list and a diagnostic, and the rest of
//! the week is unaffected.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Canonical Monday-first weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// 1 is Monday, 7 is Sunday; anything else has no weekday.
    pub fn from_day_number(day_number: i64) -> Option<Self> {
        let index = usize::try_from(day_number.checked_sub(1)?).ok()?;
        Self::ALL.get(index).copied()
    }

    pub fn day_number(self) -> u8 {
        self as u8 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    /// Three-letter label used by chart summaries ("Mon").
    pub fn short_label(self) -> &'static str {
        match self {
            Weekday::Monday => "Mon",
            Weekday::Tuesday => "Tue",
            Weekday::Wednesday => "Wed",
            Weekday::Thursday => "Thu",
            Weekday::Friday => "Fri",
            Weekday::Saturday => "Sat",
            Weekday::Sunday => "Sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One meal of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub slot: String,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// A stored day as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHistoryRecord {
    #[serde(alias = "dayNumber")]
    pub day_number: i64,
    #[serde(alias = "mealsPayload", alias = "meals_payload")]
    pub meals_json: String,
}

/// Wire shape of a day payload. Fields are optional because the payload is
/// produced by an upstream generator and only loosely trusted.
#[derive(Debug, Deserialize)]
struct MealsPayload {
    #[serde(default)]
    meals: Option<Vec<MealEntryDto>>,
}

#[derive(Debug, Deserialize)]
struct MealEntryDto {
    #[serde(default, alias = "meal")]
    slot: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default)]
    protein: Option<f64>,
    #[serde(default)]
    carbs: Option<f64>,
    #[serde(default)]
    fats: Option<f64>,
}

/// Payload sent to storage when a plan is generated.
#[derive(Debug, Serialize)]
pub struct MealsPayloadRef<'a> {
    pub meals: &'a [MealEntry],
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("meal {index} has an invalid {field}: {value}")]
    InvalidNumber {
        index: usize,
        field: &'static str,
        value: f64,
    },
}

fn amount(index: usize, field: &'static str, value: Option<f64>) -> Result<f64, PayloadError> {
    let value = value.unwrap_or(0.0);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(PayloadError::InvalidNumber { index, field, value })
    }
}

impl MealEntryDto {
    fn into_entry(self, index: usize) -> Result<MealEntry, PayloadError> {
        Ok(MealEntry {
            calories: amount(index, "calories", self.calories)?,
            protein: amount(index, "protein", self.protein)?,
            carbs: amount(index, "carbs", self.carbs)?,
            fats: amount(index, "fats", self.fats)?,
            slot: self.slot.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        })
    }
}

/// Decodes one day's payload. A missing or null `meals` field is an empty day.
pub fn decode_meals(payload: &str) -> Result<Vec<MealEntry>, PayloadError> {
    let parsed: MealsPayload = serde_json::from_str(payload)?;
    parsed
        .meals
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, dto)| dto.into_entry(i))
        .collect()
}

/// Weekday to ordered meals. Only days present in the input have a key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSchedule(BTreeMap<Weekday, Vec<MealEntry>>);

impl NormalizedSchedule {
    pub fn get(&self, day: Weekday) -> Option<&[MealEntry]> {
        self.0.get(&day).map(Vec::as_slice)
    }

    pub fn insert(&mut self, day: Weekday, meals: Vec<MealEntry>) {
        self.0.insert(day, meals);
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains_key(&day)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Days in canonical order.
    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[MealEntry])> {
        self.0.iter().map(|(d, m)| (*d, m.as_slice()))
    }
}

impl FromIterator<(Weekday, Vec<MealEntry>)> for NormalizedSchedule {
    fn from_iter<I: IntoIterator<Item = (Weekday, Vec<MealEntry>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Why a record did not contribute meals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDiagnostic {
    pub day_number: i64,
    pub weekday: Option<Weekday>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Normalized {
    pub schedule: NormalizedSchedule,
    pub diagnostics: Vec<DayDiagnostic>,
}

/// Builds the schedule from records in any order. Never fails: undecodable
/// days become empty lists, out-of-range day numbers are skipped, and a later
/// record for the same day replaces an earlier one.
pub fn normalize(records: &[DayHistoryRecord]) -> Normalized {
    let mut out = Normalized::default();

    for record in records {
        let Some(day) = Weekday::from_day_number(record.day_number) else {
            warn!(day_number = record.day_number, "history record outside 1..=7 ignored");
            out.diagnostics.push(DayDiagnostic {
                day_number: record.day_number,
                weekday: None,
                reason: "day number outside 1..=7".into(),
            });
            continue;
        };

        let meals = match decode_meals(&record.meals_json) {
            Ok(meals) => meals,
            Err(e) => {
                warn!(day_number = record.day_number, weekday = %day, error = %e, "meals payload could not be decoded");
                out.diagnostics.push(DayDiagnostic {
                    day_number: record.day_number,
                    weekday: Some(day),
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };
        out.schedule.insert(day, meals);
    }

    out
}
