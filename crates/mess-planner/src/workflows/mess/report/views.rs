use super::super::domain::{DietaryPreference, VariantId, VariantType};
use super::MealSlot;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct VariantCoverageRow {
    pub variant_id: VariantId,
    pub recipe_name: String,
    pub variant_type: VariantType,
    pub variant_type_label: &'static str,
    pub cost: f64,
    pub acceptable: usize,
    pub warning: usize,
    pub blocked: usize,
    pub offered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceRow {
    pub preference: DietaryPreference,
    pub preference_label: &'static str,
    pub count: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevel {
    FullyServed,
    Monitor,
    AtRisk,
}

impl ServiceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullyServed => "Fully Served",
            Self::Monitor => "Monitor",
            Self::AtRisk => "At Risk",
        }
    }

    pub(crate) fn from_coverage(covered: usize, total: usize, percentage: u32) -> Self {
        if total > 0 && covered == total {
            Self::FullyServed
        } else if total == 0 || percentage >= 90 {
            Self::Monitor
        } else {
            Self::AtRisk
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealPlanSummary {
    pub meal_date: NaiveDate,
    pub meal_slot: MealSlot,
    pub meal_slot_label: &'static str,
    pub service_level: ServiceLevel,
    pub service_level_label: &'static str,
    pub coverage_percentage: u32,
    pub covered_students: usize,
    pub total_students: usize,
    pub allergen_safe_percent: u32,
    pub avg_cost_per_student: f64,
    pub variant_rows: Vec<VariantCoverageRow>,
    pub preference_rows: Vec<PreferenceRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}
