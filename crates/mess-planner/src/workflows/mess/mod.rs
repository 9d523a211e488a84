//! Meal-variant matching and allocation for the mess module.
//!
//! Every operation is a pure function of a cohort of [`StudentDietaryProfile`]s and a
//! catalogue of [`VariantOption`]s. Inputs are validated when they are constructed or
//! deserialized, so the functions here never fail.

mod allergens;
mod cost;
mod coverage;
pub mod domain;
mod matching;
mod matrix;
mod nutrition;
mod preferences;
pub mod report;
mod rounding;
pub mod router;

pub use allergens::{filter_by_allergens, AllergenPartition};
pub use cost::{analyze_cost, CostAnalysis};
pub use coverage::{
    select_optimal, CoverageDetails, CoverageSummary, OptimalSelection, VariantCoverage,
    MAX_OFFERED_CATEGORIES,
};
pub use domain::{
    ensure_unique_students, AllergenId, DietaryPreference, NutritionProfile, NutritionTarget,
    StudentDietaryProfile, StudentId, Tolerance, ValidationError, VariantId, VariantOption,
    VariantType,
};
pub use matching::{classify, match_cohort, match_student, CohortMatch, MatchBucket, MatchResult};
pub use matrix::{allergen_safe, build_matrix, CompatibilityMatrix, MatrixSummary};
pub use nutrition::{match_by_nutrition, NutritionMatches};
pub use preferences::{profile_preferences, PreferenceProfile, PreferenceShare};
pub use report::{MealPlanReport, MealSlot};
pub use rounding::{round_currency, round_percent};
pub use router::mess_router;
