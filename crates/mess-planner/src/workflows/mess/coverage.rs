use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::debug;

use super::domain::{StudentDietaryProfile, StudentId, VariantId, VariantOption, VariantType};
use super::matching::match_cohort;
use super::rounding::round_percent;

/// At most one variant per category, and no more than this many categories, are offered.
pub const MAX_OFFERED_CATEGORIES: usize = 3;

/// Distinct-student reach of one chosen variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCoverage {
    pub variant_id: VariantId,
    pub variant_type: VariantType,
    pub students_covered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageDetails {
    /// Distinct students with at least one acceptable variant in the offer set.
    pub covered_students: usize,
    pub total_students: usize,
    pub uncovered_student_ids: Vec<StudentId>,
    pub variant_coverage: Vec<VariantCoverage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    /// Nearest-integer share of covered students, except that a cohort with any uncovered
    /// student reports at most 99 so that 100 always means everyone is served.
    pub percentage: u32,
    pub details: CoverageDetails,
}

/// Offer set chosen for a meal along with how much of the cohort it serves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalSelection {
    pub optimal: Vec<VariantOption>,
    pub coverage: CoverageSummary,
    pub recommendations: Vec<String>,
}

pub fn select_optimal(
    students: &[StudentDietaryProfile],
    variants: &[VariantOption],
) -> OptimalSelection {
    let cohort = match_cohort(students, variants);
    let acceptable: Vec<HashSet<&VariantId>> = cohort
        .matches
        .iter()
        .map(|result| result.acceptable().map(VariantOption::id).collect())
        .collect();

    let reach: Vec<BTreeSet<usize>> = variants
        .iter()
        .map(|variant| {
            acceptable
                .iter()
                .enumerate()
                .filter(|(_, ids)| ids.contains(variant.id()))
                .map(|(student_index, _)| student_index)
                .collect()
        })
        .collect();

    let mut ranked: Vec<usize> = (0..variants.len()).collect();
    ranked.sort_by(|left, right| {
        reach[*right]
            .len()
            .cmp(&reach[*left].len())
            .then_with(|| left.cmp(right))
    });

    let chosen = pick_one_per_category(&ranked, variants);

    let chosen_ids: HashSet<&VariantId> = chosen.iter().map(|index| variants[*index].id()).collect();
    let covered: Vec<bool> = acceptable
        .iter()
        .map(|ids| ids.iter().any(|id| chosen_ids.contains(id)))
        .collect();
    let covered_students = covered.iter().filter(|is_covered| **is_covered).count();
    let total_students = students.len();

    let mut percentage = round_percent(covered_students, total_students);
    if covered_students < total_students {
        // rounding must never report a partial cohort as fully served
        percentage = percentage.min(99);
    }

    let uncovered: Vec<&StudentDietaryProfile> = students
        .iter()
        .zip(&covered)
        .filter(|(_, is_covered)| !**is_covered)
        .map(|(student, _)| student)
        .collect();

    let recommendations = coverage_recommendations(total_students, &uncovered);

    debug!(
        students = total_students,
        variants = variants.len(),
        chosen = chosen.len(),
        covered_students,
        percentage,
        "selected optimal variant set"
    );

    OptimalSelection {
        optimal: chosen.iter().map(|index| variants[*index].clone()).collect(),
        coverage: CoverageSummary {
            percentage,
            details: CoverageDetails {
                covered_students,
                total_students,
                uncovered_student_ids: uncovered.iter().map(|student| student.id().clone()).collect(),
                variant_coverage: chosen
                    .iter()
                    .map(|index| VariantCoverage {
                        variant_id: variants[*index].id().clone(),
                        variant_type: variants[*index].variant_type(),
                        students_covered: reach[*index].len(),
                    })
                    .collect(),
            },
        },
        recommendations,
    }
}

/// Walks coverage-ranked catalogue indices keeping the first variant seen per category.
fn pick_one_per_category(ranked: &[usize], variants: &[VariantOption]) -> Vec<usize> {
    let mut seen: Vec<VariantType> = Vec::with_capacity(MAX_OFFERED_CATEGORIES);
    let mut chosen = Vec::with_capacity(MAX_OFFERED_CATEGORIES);

    for &index in ranked {
        if seen.len() == MAX_OFFERED_CATEGORIES {
            break;
        }
        let variant_type = variants[index].variant_type();
        if seen.contains(&variant_type) {
            continue;
        }
        seen.push(variant_type);
        chosen.push(index);
    }

    chosen
}

fn coverage_recommendations(
    total_students: usize,
    uncovered: &[&StudentDietaryProfile],
) -> Vec<String> {
    if total_students == 0 {
        return Vec::new();
    }

    if uncovered.is_empty() {
        return vec!["All students have at least one safe option in the selected variants".to_string()];
    }

    let (with_allergies, preference_only): (Vec<&StudentDietaryProfile>, Vec<_>) = uncovered
        .iter()
        .copied()
        .partition(|student| student.has_allergy_entries());

    let mut recommendations = Vec::new();
    if !with_allergies.is_empty() {
        recommendations.push(format!(
            "{} student(s) with recorded allergies have no safe option in the selected variants; consider adding an allergen-free alternative",
            with_allergies.len()
        ));
    }
    if !preference_only.is_empty() {
        recommendations.push(format!(
            "{} student(s) without allergy restrictions are not served by the selected variants; review the dietary categories on offer",
            preference_only.len()
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mess::domain::{DietaryPreference, NutritionProfile};

    fn variant(id: &str, variant_type: VariantType, allergens: &[&str]) -> VariantOption {
        VariantOption::new(
            id,
            variant_type,
            format!("recipe {id}"),
            35.0,
            NutritionProfile::new(450.0, 20.0, 55.0, 12.0),
        )
        .expect("valid variant")
        .with_allergens(allergens.iter().copied())
    }

    fn student(id: &str, preference: DietaryPreference) -> StudentDietaryProfile {
        StudentDietaryProfile::new(id, preference).expect("valid student")
    }

    fn chosen_ids(selection: &OptimalSelection) -> Vec<&str> {
        selection
            .optimal
            .iter()
            .map(|variant| variant.id().0.as_str())
            .collect()
    }

    #[test]
    fn same_category_catalogue_offers_single_best_variant() {
        // each student tolerates exactly one of the three veg dishes
        let catalogue = vec![
            variant("paneer", VariantType::Veg, &["dairy"]),
            variant("upma", VariantType::Veg, &["gluten"]),
            variant("poha", VariantType::Veg, &["peanut"]),
        ];
        let students = vec![
            student("s1", DietaryPreference::Veg).with_verified_allergies(["gluten", "peanut"]),
            student("s2", DietaryPreference::Veg).with_verified_allergies(["dairy", "peanut"]),
            student("s3", DietaryPreference::Veg).with_verified_allergies(["dairy", "gluten"]),
        ];

        let selection = select_optimal(&students, &catalogue);

        assert_eq!(chosen_ids(&selection), vec!["paneer"]);
        assert_eq!(selection.coverage.percentage, 33);
        assert_eq!(selection.coverage.details.covered_students, 1);
        assert_eq!(
            selection.coverage.details.uncovered_student_ids,
            vec![StudentId::from("s2"), StudentId::from("s3")]
        );
        assert_eq!(selection.recommendations.len(), 1);
        assert!(selection.recommendations[0].starts_with("2 student(s) with recorded allergies"));
    }

    #[test]
    fn highest_coverage_variant_wins_its_category() {
        let catalogue = vec![
            variant("veg-dairy", VariantType::Veg, &["dairy"]),
            variant("veg-plain", VariantType::Veg, &[]),
            variant("chicken", VariantType::NonVeg, &["dairy"]),
            variant("fish", VariantType::NonVeg, &[]),
            variant("tofu", VariantType::Vegan, &["soy"]),
        ];
        let students = vec![
            student("s1", DietaryPreference::Veg).with_verified_allergies(["dairy"]),
            student("s2", DietaryPreference::NonVeg).with_severe_allergies(["soy"]),
            student("s3", DietaryPreference::Any),
        ];

        let selection = select_optimal(&students, &catalogue);

        assert_eq!(chosen_ids(&selection), vec!["veg-plain", "fish", "tofu"]);
        assert_eq!(selection.coverage.percentage, 100);
        assert_eq!(
            selection.recommendations,
            vec!["All students have at least one safe option in the selected variants".to_string()]
        );
        let reach: Vec<usize> = selection
            .coverage
            .details
            .variant_coverage
            .iter()
            .map(|entry| entry.students_covered)
            .collect();
        assert_eq!(reach, vec![3, 3, 2]);
    }

    #[test]
    fn ties_fall_back_to_catalogue_order() {
        let catalogue = vec![
            variant("first", VariantType::Vegan, &[]),
            variant("second", VariantType::Vegan, &[]),
            variant("third", VariantType::Veg, &[]),
        ];
        let students = vec![student("s1", DietaryPreference::Any)];

        let selection = select_optimal(&students, &catalogue);

        assert_eq!(chosen_ids(&selection), vec!["first", "third"]);
    }

    #[test]
    fn offer_set_is_capped_at_one_variant_per_category() {
        let mut catalogue = Vec::new();
        for index in 0..12 {
            let variant_type = VariantType::ordered()[index % 3];
            catalogue.push(variant(&format!("v{index}"), variant_type, &[]));
        }
        let students: Vec<_> = (0..40)
            .map(|index| student(&format!("s{index}"), DietaryPreference::ordered()[index % 4]))
            .collect();

        let selection = select_optimal(&students, &catalogue);

        assert_eq!(selection.optimal.len(), MAX_OFFERED_CATEGORIES);
        let categories: HashSet<VariantType> = selection
            .optimal
            .iter()
            .map(VariantOption::variant_type)
            .collect();
        assert_eq!(categories.len(), selection.optimal.len());
    }

    #[test]
    fn partial_coverage_never_rounds_up_to_full() {
        let catalogue = vec![variant("dal", VariantType::Veg, &["lentil"])];
        let mut students: Vec<_> = (0..250)
            .map(|index| student(&format!("s{index}"), DietaryPreference::Veg))
            .collect();
        students.push(
            student("allergic", DietaryPreference::Veg).with_anaphylaxis_allergies(["lentil"]),
        );

        let selection = select_optimal(&students, &catalogue);

        assert_eq!(selection.coverage.details.covered_students, 250);
        assert_eq!(selection.coverage.percentage, 99);
    }

    #[test]
    fn uncovered_students_without_allergies_are_reported_separately() {
        let selection = select_optimal(
            &[
                student("s1", DietaryPreference::Vegan),
                student("s2", DietaryPreference::Veg).with_verified_allergies(["soy"]),
            ],
            &[],
        );

        assert!(selection.optimal.is_empty());
        assert_eq!(selection.coverage.percentage, 0);
        assert_eq!(selection.recommendations.len(), 2);
        assert!(selection.recommendations[1].starts_with("1 student(s) without allergy"));
    }

    #[test]
    fn recommendations_split_uncovered_students_by_allergy_entries() {
        let peanut = student("s1", DietaryPreference::Veg).with_anaphylaxis_allergies(["peanut"]);
        let dairy = student("s2", DietaryPreference::Veg).with_severe_allergies(["dairy"]);
        let picky = student("s3", DietaryPreference::Vegan);

        let recommendations = coverage_recommendations(5, &[&peanut, &picky, &dairy]);

        assert_eq!(recommendations.len(), 2);
        assert!(recommendations[0].starts_with("2 student(s) with recorded allergies"));
        assert!(recommendations[1].starts_with("1 student(s) without allergy restrictions"));
    }

    #[test]
    fn empty_cohort_reports_zero_coverage() {
        let catalogue = vec![variant("dal", VariantType::Veg, &[])];
        let selection = select_optimal(&[], &catalogue);

        assert_eq!(selection.coverage.percentage, 0);
        assert_eq!(chosen_ids(&selection), vec!["dal"]);
        assert!(selection.recommendations.is_empty());
    }
}
