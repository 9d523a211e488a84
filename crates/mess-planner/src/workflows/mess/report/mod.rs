mod summary;
pub mod views;

use serde::{Deserialize, Serialize};

pub use summary::{CohortTotals, MealPlanReport};

/// Meal service within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    #[default]
    Lunch,
    Snacks,
    Dinner,
}

impl MealSlot {
    pub fn ordered() -> [MealSlot; 4] {
        [
            MealSlot::Breakfast,
            MealSlot::Lunch,
            MealSlot::Snacks,
            MealSlot::Dinner,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Snacks => "Snacks",
            MealSlot::Dinner => "Dinner",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|slot| slot.label().eq_ignore_ascii_case(raw.trim()))
    }
}
