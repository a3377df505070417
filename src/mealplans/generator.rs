//! Deterministic week generator used when a plan is created.
//!
//! Daily targets are split over the day's slots by fixed weights; meal names
//! rotate through a small menu per slot so consecutive days differ.

use super::schedule::{MealEntry, MealsPayloadRef, Weekday};
use crate::nutrition::MacroGrams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl Slot {
    fn label(self) -> &'static str {
        match self {
            Slot::Breakfast => "Breakfast",
            Slot::Lunch => "Lunch",
            Slot::Dinner => "Dinner",
            Slot::Snack => "Snack",
        }
    }

    fn menu(self) -> &'static [&'static str] {
        match self {
            Slot::Breakfast => &[
                "Oatmeal with Berries & Almonds",
                "Scrambled Eggs with Avocado Toast",
                "Protein Pancakes with Blueberries",
                "Greek Yogurt Parfait with Granola",
                "Veggie Omelette with Whole Grain Toast",
            ],
            Slot::Lunch => &[
                "Grilled Chicken Quinoa Bowl",
                "Turkey & Spinach Wrap",
                "Tuna Salad with Whole Grain Crackers",
                "Chicken Burrito Bowl",
                "Turkey Chili with Beans",
                "Salmon Poke Bowl",
            ],
            Slot::Dinner => &[
                "Salmon with Sweet Potato & Broccoli",
                "Lean Beef Stir-Fry with Brown Rice",
                "Grilled Chicken with Pasta & Vegetables",
                "Baked Cod with Rice & Green Beans",
            ],
            Slot::Snack => &[
                "Greek Yogurt with Honey",
                "Protein Shake",
                "Apple with Almond Butter",
                "Cottage Cheese with Berries",
                "Mixed Nuts & Dried Fruit",
                "Hummus with Carrot Sticks",
                "Edamame",
            ],
        }
    }
}

/// Slot layout and percentage of the daily target per slot. Weights sum to 100.
fn layout(meals_per_day: u8) -> &'static [(Slot, u32)] {
    use Slot::*;
    match meals_per_day {
        0..=3 => &[(Breakfast, 30), (Lunch, 35), (Dinner, 35)],
        4 => &[(Breakfast, 25), (Lunch, 30), (Snack, 15), (Dinner, 30)],
        5 => &[(Breakfast, 20), (Snack, 10), (Lunch, 30), (Snack, 10), (Dinner, 30)],
        _ => &[
            (Breakfast, 20),
            (Snack, 10),
            (Lunch, 25),
            (Snack, 10),
            (Dinner, 25),
            (Snack, 10),
        ],
    }
}

/// `total * percent / 100`, rounded half up.
fn share(total: u32, percent: u32) -> f64 {
    let scaled = u64::from(total) * u64::from(percent) + 50;
    (scaled / 100) as f64
}

/// One generated day ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDay {
    pub day: Weekday,
    pub meals: Vec<MealEntry>,
}

impl GeneratedDay {
    pub fn day_number(&self) -> i32 {
        i32::from(self.day.day_number())
    }

    pub fn meals_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&MealsPayloadRef { meals: &self.meals })
    }
}

/// Meals for one weekday.
pub fn day_meals(day: Weekday, daily_calories: u32, macros: MacroGrams, meals_per_day: u8) -> Vec<MealEntry> {
    let offset = usize::from(day.day_number() - 1);
    let mut seen_snacks = 0;

    layout(meals_per_day)
        .iter()
        .map(|&(slot, weight)| {
            let menu = slot.menu();
            let mut pick = offset;
            if slot == Slot::Snack {
                // two snacks on the same day should not repeat
                pick += seen_snacks * 3;
                seen_snacks += 1;
            }
            MealEntry {
                slot: slot.label().to_string(),
                name: menu[pick % menu.len()].to_string(),
                calories: share(daily_calories, weight),
                protein: share(macros.protein, weight),
                carbs: share(macros.carbs, weight),
                fats: share(macros.fats, weight),
            }
        })
        .collect()
}

/// Monday through Sunday.
pub fn generate_week(daily_calories: u32, macros: MacroGrams, meals_per_day: u8) -> Vec<GeneratedDay> {
    Weekday::ALL
        .iter()
        .map(|&day| GeneratedDay {
            day,
            meals: day_meals(day, daily_calories, macros, meals_per_day),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mealplans::schedule::{normalize, DayHistoryRecord};

    const MACROS: MacroGrams = MacroGrams {
        protein: 188,
        carbs: 250,
        fats: 83,
    };

    #[test]
    fn weights_sum_to_one_hundred() {
        for n in 3..=6 {
            let total: u32 = layout(n).iter().map(|(_, w)| w).sum();
            assert_eq!(total, 100, "meals_per_day = {n}");
            assert_eq!(layout(n).len(), usize::from(n));
        }
    }

    #[test]
    fn week_has_seven_days_in_order() {
        let week = generate_week(2500, MACROS, 4);
        let numbers: Vec<i32> = week.iter().map(GeneratedDay::day_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7]);
        assert!(week.iter().all(|d| d.meals.len() == 4));
    }

    #[test]
    fn day_totals_stay_close_to_targets() {
        for n in 3..=6 {
            let meals = day_meals(Weekday::Friday, 2500, MACROS, n);
            let kcal: f64 = meals.iter().map(|m| m.calories).sum();
            let protein: f64 = meals.iter().map(|m| m.protein).sum();
            assert!((kcal - 2500.0).abs() <= n as f64, "kcal {kcal} for {n} meals");
            assert!((protein - 188.0).abs() <= n as f64);
        }
    }

    #[test]
    fn three_meal_split() {
        let meals = day_meals(Weekday::Monday, 2000, MACROS, 3);
        let kcal: Vec<f64> = meals.iter().map(|m| m.calories).collect();
        assert_eq!(kcal, vec![600.0, 700.0, 700.0]);
        assert_eq!(meals[0].name, "Oatmeal with Berries & Almonds");
        assert_eq!(meals[2].slot, "Dinner");
    }

    #[test]
    fn snacks_differ_within_a_day() {
        let meals = day_meals(Weekday::Tuesday, 2200, MACROS, 6);
        let snacks: Vec<&str> = meals.iter().filter(|m| m.slot == "Snack").map(|m| m.name.as_str()).collect();
        assert_eq!(snacks.len(), 3);
        assert_ne!(snacks[0], snacks[1]);
        assert_ne!(snacks[1], snacks[2]);
    }

    #[test]
    fn generated_payloads_normalize_cleanly() {
        let records: Vec<DayHistoryRecord> = generate_week(1800, MACROS, 5)
            .iter()
            .map(|d| DayHistoryRecord {
                day_number: i64::from(d.day_number()),
                meals_json: d.meals_json().unwrap(),
            })
            .collect();

        let normalized = normalize(&records);

        assert!(normalized.diagnostics.is_empty());
        assert_eq!(normalized.schedule.len(), 7);
        assert_eq!(normalized.schedule.get(Weekday::Sunday).unwrap().len(), 5);
    }
}
