use super::super::coverage::{select_optimal, OptimalSelection};
use super::super::cost::{analyze_cost, CostAnalysis};
use super::super::domain::{
    DietaryPreference, NutritionTarget, StudentDietaryProfile, VariantOption,
};
use super::super::matching::{classify, match_cohort, MatchBucket};
use super::super::matrix::{build_matrix, MatrixSummary};
use super::super::nutrition::{match_by_nutrition, NutritionMatches};
use super::super::preferences::{profile_preferences, PreferenceProfile};
use super::views::{MealPlanSummary, PreferenceRow, ServiceLevel, VariantCoverageRow};
use super::MealSlot;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

/// Flat cohort aggregates without the per-student partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortTotals {
    pub students: usize,
    pub variants: usize,
    pub total_acceptable_slots: usize,
    pub blocked: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct BucketCounts {
    acceptable: usize,
    warning: usize,
    blocked: usize,
}

/// Every engine output for one meal service, computed from the same cohort and catalogue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanReport {
    pub meal_date: NaiveDate,
    pub meal_slot: MealSlot,
    pub cohort: CohortTotals,
    pub selection: OptimalSelection,
    pub preferences: PreferenceProfile,
    pub cost: CostAnalysis,
    pub compatibility: MatrixSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionMatches>,
    #[serde(skip)]
    variants: Vec<VariantOption>,
    #[serde(skip)]
    bucket_counts: Vec<BucketCounts>,
}

impl MealPlanReport {
    pub fn build(
        meal_date: NaiveDate,
        meal_slot: MealSlot,
        students: &[StudentDietaryProfile],
        variants: &[VariantOption],
        nutrition_target: Option<&NutritionTarget>,
    ) -> Self {
        let cohort = match_cohort(students, variants);
        let bucket_counts = tally_buckets(students, variants);
        let selection = select_optimal(students, variants);
        let preferences = profile_preferences(students);
        let cost = analyze_cost(students, variants);
        let compatibility = build_matrix(students, variants).summary;
        let nutrition = nutrition_target
            .map(|target| match_by_nutrition(variants, target.profile(), target.tolerance()));

        info!(
            %meal_date,
            meal_slot = meal_slot.label(),
            students = students.len(),
            variants = variants.len(),
            coverage = selection.coverage.percentage,
            "built meal plan report"
        );

        Self {
            meal_date,
            meal_slot,
            cohort: CohortTotals {
                students: students.len(),
                variants: variants.len(),
                total_acceptable_slots: cohort.total_acceptable_slots,
                blocked: cohort.blocked,
                warnings: cohort.warnings,
            },
            selection,
            preferences,
            cost,
            compatibility,
            nutrition,
            variants: variants.to_vec(),
            bucket_counts,
        }
    }

    pub fn summary(&self) -> MealPlanSummary {
        let details = &self.selection.coverage.details;
        let offered: Vec<_> = self.selection.optimal.iter().map(VariantOption::id).collect();

        let variant_rows = self
            .variants
            .iter()
            .zip(&self.bucket_counts)
            .map(|(variant, counts)| VariantCoverageRow {
                variant_id: variant.id().clone(),
                recipe_name: variant.recipe_name().to_string(),
                variant_type: variant.variant_type(),
                variant_type_label: variant.variant_type().label(),
                cost: variant.cost(),
                acceptable: counts.acceptable,
                warning: counts.warning,
                blocked: counts.blocked,
                offered: offered.contains(&variant.id()),
            })
            .collect();

        let preference_rows = DietaryPreference::ordered()
            .into_iter()
            .map(|preference| {
                let share = self.preferences.share(preference);
                PreferenceRow {
                    preference,
                    preference_label: preference.label(),
                    count: share.count,
                    percentage: share.percentage,
                }
            })
            .collect();

        let service_level = ServiceLevel::from_coverage(
            details.covered_students,
            details.total_students,
            self.selection.coverage.percentage,
        );

        let recommendations = self
            .selection
            .recommendations
            .iter()
            .chain(&self.cost.recommendations)
            .cloned()
            .collect();

        MealPlanSummary {
            meal_date: self.meal_date,
            meal_slot: self.meal_slot,
            meal_slot_label: self.meal_slot.label(),
            service_level,
            service_level_label: service_level.label(),
            coverage_percentage: self.selection.coverage.percentage,
            covered_students: details.covered_students,
            total_students: details.total_students,
            allergen_safe_percent: self.compatibility.percent,
            avg_cost_per_student: self.cost.avg_cost_per_student,
            variant_rows,
            preference_rows,
            recommendations,
        }
    }
}

/// Per-variant bucket counts in catalogue order, one classification per (student, variant) pair.
fn tally_buckets(
    students: &[StudentDietaryProfile],
    variants: &[VariantOption],
) -> Vec<BucketCounts> {
    let mut tallies = vec![BucketCounts::default(); variants.len()];

    for student in students {
        for (counts, variant) in tallies.iter_mut().zip(variants) {
            match classify(student, variant) {
                MatchBucket::Recommended | MatchBucket::Safe => counts.acceptable += 1,
                MatchBucket::Warning => counts.warning += 1,
                MatchBucket::Blocked => counts.blocked += 1,
            }
        }
    }

    tallies
}
