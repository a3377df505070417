//! Example data shown when a plan view has nothing real to render.
//!
//! Substitution is all-or-nothing per section: a section is replaced only
//! when its source is entirely empty. A schedule with some empty days is real
//! data and is returned as is.

use lazy_static::lazy_static;

use super::dto::{DaySummary, FallbackUsage, MealPlan, PlanView};
use super::schedule::{MealEntry, Normalized, NormalizedSchedule, Weekday};
use crate::nutrition::MacroGrams;

pub const EXAMPLE_MACROS: MacroGrams = MacroGrams {
    protein: 180,
    carbs: 250,
    fats: 70,
};

const EXAMPLE_WEEK: [(u32, u32, u32, u32); 7] = [
    // calories, protein, carbs, fats
    (2500, 180, 250, 70),
    (2480, 175, 260, 68),
    (2520, 185, 245, 72),
    (2490, 178, 255, 69),
    (2510, 182, 248, 71),
    (2500, 180, 250, 70),
    (2500, 180, 250, 70),
];

type MealRow = (&'static str, &'static str, u32, u32, u32, u32);

const EXAMPLE_MEALS: [(Weekday, [MealRow; 5]); 7] = [
    (Weekday::Monday, [
        ("Breakfast", "Oatmeal with Berries & Almonds", 450, 15, 65, 12),
        ("Lunch", "Grilled Chicken Quinoa Bowl", 650, 45, 70, 18),
        ("Snack", "Greek Yogurt with Honey", 200, 20, 25, 5),
        ("Dinner", "Salmon with Sweet Potato & Broccoli", 700, 50, 60, 25),
        ("Snack", "Protein Shake", 250, 30, 15, 8),
    ]),
    (Weekday::Tuesday, [
        ("Breakfast", "Scrambled Eggs with Avocado Toast", 480, 25, 45, 22),
        ("Lunch", "Turkey & Spinach Wrap", 550, 40, 55, 18),
        ("Snack", "Apple with Almond Butter", 220, 8, 28, 12),
        ("Dinner", "Lean Beef Stir-Fry with Brown Rice", 750, 52, 75, 20),
        ("Snack", "Cottage Cheese with Berries", 180, 22, 18, 4),
    ]),
    (Weekday::Wednesday, [
        ("Breakfast", "Protein Pancakes with Blueberries", 500, 30, 60, 15),
        ("Lunch", "Tuna Salad with Whole Grain Crackers", 580, 42, 50, 20),
        ("Snack", "Mixed Nuts & Dried Fruit", 250, 8, 30, 14),
        ("Dinner", "Grilled Chicken with Pasta & Vegetables", 720, 55, 68, 22),
        ("Snack", "Casein Protein Shake", 230, 28, 12, 6),
    ]),
    (Weekday::Thursday, [
        ("Breakfast", "Greek Yogurt Parfait with Granola", 460, 28, 58, 12),
        ("Lunch", "Chicken Burrito Bowl", 640, 46, 72, 16),
        ("Snack", "Hummus with Carrot Sticks", 210, 7, 24, 10),
        ("Dinner", "Baked Cod with Rice & Green Beans", 680, 48, 74, 14),
        ("Snack", "Protein Shake", 250, 30, 15, 8),
    ]),
    (Weekday::Friday, [
        ("Breakfast", "Veggie Omelette with Whole Grain Toast", 470, 30, 40, 20),
        ("Lunch", "Turkey Chili with Beans", 600, 44, 62, 16),
        ("Snack", "Banana with Peanut Butter", 280, 8, 34, 14),
        ("Dinner", "Shrimp Stir-Fry with Noodles", 700, 46, 80, 18),
        ("Snack", "Cottage Cheese with Pineapple", 190, 22, 20, 3),
    ]),
    (Weekday::Saturday, [
        ("Breakfast", "Overnight Oats with Chia", 450, 18, 62, 14),
        ("Lunch", "Grilled Chicken Caesar Wrap", 620, 45, 52, 22),
        ("Snack", "Edamame", 190, 17, 14, 8),
        ("Dinner", "Steak with Baked Potato & Asparagus", 760, 52, 64, 26),
        ("Snack", "Casein Protein Shake", 230, 28, 12, 6),
    ]),
    (Weekday::Sunday, [
        ("Breakfast", "Whole Grain Waffles with Berries", 480, 20, 70, 12),
        ("Lunch", "Salmon Poke Bowl", 640, 40, 70, 20),
        ("Snack", "Trail Mix", 240, 7, 26, 13),
        ("Dinner", "Roast Chicken with Quinoa & Vegetables", 700, 54, 60, 20),
        ("Snack", "Greek Yogurt with Walnuts", 220, 20, 12, 10),
    ]),
];

lazy_static! {
    static ref EXAMPLE_SCHEDULE: NormalizedSchedule = EXAMPLE_MEALS
        .iter()
        .map(|(day, meals)| {
            let meals = meals
                .iter()
                .map(|&(slot, name, calories, protein, carbs, fats)| MealEntry {
                    slot: slot.to_string(),
                    name: name.to_string(),
                    calories: f64::from(calories),
                    protein: f64::from(protein),
                    carbs: f64::from(carbs),
                    fats: f64::from(fats),
                })
                .collect();
            (*day, meals)
        })
        .collect();
}

/// A plan counts as absent when it is missing or carries no calorie or macro data.
fn usable(plan: Option<&MealPlan>) -> Option<&MealPlan> {
    plan.filter(|p| p.daily_calories > 0 || !p.macro_grams().is_zero())
}

/// Macro split for the breakdown chart.
pub fn macro_breakdown(plan: Option<&MealPlan>) -> (MacroGrams, bool) {
    match usable(plan).map(MealPlan::macro_grams) {
        Some(m) if !m.is_zero() => (m, false),
        _ => (EXAMPLE_MACROS, true),
    }
}

/// Per-weekday targets for the weekly chart.
pub fn weekly_summary(plan: Option<&MealPlan>) -> (Vec<DaySummary>, bool) {
    match usable(plan) {
        Some(p) => {
            let m = p.macro_grams();
            let calories = u32::try_from(p.daily_calories).unwrap_or(0);
            let week = Weekday::ALL
                .iter()
                .map(|d| DaySummary {
                    day: d.short_label(),
                    calories,
                    protein: m.protein,
                    carbs: m.carbs,
                    fats: m.fats,
                })
                .collect();
            (week, false)
        }
        None => (example_week(), true),
    }
}

/// Returns `schedule` untouched unless it has no days at all.
pub fn schedule_or_example(schedule: NormalizedSchedule) -> (NormalizedSchedule, bool) {
    if schedule.is_empty() {
        (EXAMPLE_SCHEDULE.clone(), true)
    } else {
        (schedule, false)
    }
}

fn example_week() -> Vec<DaySummary> {
    Weekday::ALL
        .iter()
        .zip(EXAMPLE_WEEK)
        .map(|(d, (calories, protein, carbs, fats))| DaySummary {
            day: d.short_label(),
            calories,
            protein,
            carbs,
            fats,
        })
        .collect()
}

/// Assembles the plan screen from whatever was fetched.
pub fn resolve(plan: Option<MealPlan>, normalized: Normalized) -> PlanView {
    let (macros, macros_fallback) = macro_breakdown(plan.as_ref());
    let (weekly, weekly_fallback) = weekly_summary(plan.as_ref());
    let (schedule, schedule_fallback) = schedule_or_example(normalized.schedule);

    let fallback = FallbackUsage {
        macros: macros_fallback,
        weekly: weekly_fallback,
        schedule: schedule_fallback,
    };
    if fallback != FallbackUsage::default() {
        tracing::debug!(?fallback, "plan view uses example data");
    }

    PlanView {
        plan,
        macros,
        weekly,
        schedule,
        diagnostics: normalized.diagnostics,
        fallback,
    }
}
