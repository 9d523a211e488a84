use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::domain::{StudentDietaryProfile, VariantId, VariantOption};
use super::matching::match_cohort;
use super::rounding::round_currency;

/// Cost exposure if every eligible student were served each acceptable variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostAnalysis {
    pub total_cost: f64,
    pub avg_cost_per_student: f64,
    pub cost_per_variant: BTreeMap<VariantId, f64>,
    pub recommendations: Vec<String>,
}

pub fn analyze_cost(students: &[StudentDietaryProfile], variants: &[VariantOption]) -> CostAnalysis {
    if students.is_empty() {
        return CostAnalysis::default();
    }

    let cohort = match_cohort(students, variants);
    let mut total_cost = 0.0;
    let mut cost_per_variant: BTreeMap<VariantId, f64> = BTreeMap::new();

    for variant in cohort.matches.iter().flat_map(|result| result.acceptable()) {
        total_cost += variant.cost();
        *cost_per_variant.entry(variant.id().clone()).or_insert(0.0) += variant.cost();
    }

    let avg_cost_per_student = round_currency(total_cost / students.len() as f64);
    for tally in cost_per_variant.values_mut() {
        *tally = round_currency(*tally);
    }

    let recommendations = cost_spread(&cost_per_variant).into_iter().collect();

    debug!(
        students = students.len(),
        variants = variants.len(),
        total_cost,
        avg_cost_per_student,
        "analyzed cohort cost exposure"
    );

    CostAnalysis {
        total_cost: round_currency(total_cost),
        avg_cost_per_student,
        cost_per_variant,
        recommendations,
    }
}

/// Sentence on the gap between the lightest and heaviest non-zero tallies.
fn cost_spread(cost_per_variant: &BTreeMap<VariantId, f64>) -> Option<String> {
    let mut tallies = cost_per_variant.iter().filter(|(_, cost)| **cost > 0.0);
    let first = tallies.next()?;
    let (mut cheapest, mut dearest) = (first, first);
    let mut counted = 1;

    for entry in tallies {
        counted += 1;
        if entry.1 < cheapest.1 {
            cheapest = entry;
        }
        if entry.1 > dearest.1 {
            dearest = entry;
        }
    }

    if counted < 2 {
        return None;
    }

    Some(format!(
        "Cost exposure ranges from {:.2} ({}) to {:.2} ({}), a gap of {:.2} across eligible variants",
        cheapest.1,
        cheapest.0,
        dearest.1,
        dearest.0,
        round_currency(dearest.1 - cheapest.1)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mess::domain::{DietaryPreference, NutritionProfile, VariantType};

    fn variant(id: &str, variant_type: VariantType, cost: f64, allergens: &[&str]) -> VariantOption {
        VariantOption::new(
            id,
            variant_type,
            id,
            cost,
            NutritionProfile::new(400.0, 18.0, 55.0, 12.0),
        )
        .expect("valid variant")
        .with_allergens(allergens.iter().copied())
    }

    fn student(id: &str) -> StudentDietaryProfile {
        StudentDietaryProfile::new(id, DietaryPreference::Any).expect("valid student")
    }

    #[test]
    fn empty_cohort_costs_nothing() {
        let catalogue = vec![variant("dal", VariantType::Veg, 30.0, &[])];
        let analysis = analyze_cost(&[], &catalogue);

        assert_eq!(analysis.total_cost, 0.0);
        assert_eq!(analysis.avg_cost_per_student, 0.0);
        assert!(analysis.cost_per_variant.is_empty());
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn tallies_each_acceptable_occurrence() {
        let catalogue = vec![
            variant("dal", VariantType::Veg, 30.0, &[]),
            variant("fish", VariantType::NonVeg, 70.0, &["fish"]),
        ];
        let students = vec![
            student("s1"),
            student("s2"),
            student("s3").with_severe_allergies(["fish"]),
        ];

        let analysis = analyze_cost(&students, &catalogue);

        assert_eq!(analysis.total_cost, 3.0 * 30.0 + 2.0 * 70.0);
        assert_eq!(analysis.avg_cost_per_student, 76.67);
        assert_eq!(analysis.cost_per_variant[&VariantId::from("dal")], 90.0);
        assert_eq!(analysis.cost_per_variant[&VariantId::from("fish")], 140.0);
        assert_eq!(
            analysis.recommendations,
            vec![
                "Cost exposure ranges from 90.00 (dal) to 140.00 (fish), a gap of 50.00 across eligible variants"
                    .to_string()
            ]
        );
    }

    #[test]
    fn spread_needs_two_non_zero_tallies() {
        let catalogue = vec![
            variant("water", VariantType::Vegan, 0.0, &[]),
            variant("dal", VariantType::Veg, 25.0, &[]),
        ];
        let analysis = analyze_cost(&[student("s1")], &catalogue);

        assert_eq!(analysis.cost_per_variant.len(), 2);
        assert_eq!(analysis.total_cost, 25.0);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn blocked_cohort_has_zero_total_but_defined_average() {
        let catalogue = vec![variant("satay", VariantType::Veg, 40.0, &["peanut"])];
        let students = vec![student("s1").with_anaphylaxis_allergies(["peanut"])];

        let analysis = analyze_cost(&students, &catalogue);

        assert_eq!(analysis.total_cost, 0.0);
        assert_eq!(analysis.avg_cost_per_student, 0.0);
        assert!(analysis.cost_per_variant.is_empty());
    }
}
