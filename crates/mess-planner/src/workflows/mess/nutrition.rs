use serde::Serialize;

use super::domain::{NutritionProfile, Tolerance, VariantOption};

/// Multiplier applied to the calorie and protein bands for a close match.
const CLOSE_MATCH_FACTOR: f64 = 1.5;

/// Catalogue bucketed against a nutrition target.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionMatches {
    pub exact_match: Vec<VariantOption>,
    /// Ordered by calorie plus protein deviation, closest first.
    pub close_match: Vec<VariantOption>,
    pub other_options: Vec<VariantOption>,
}

#[derive(Debug, Clone, Copy)]
struct Bands {
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

impl Bands {
    fn around(target: &NutritionProfile, tolerance: Tolerance) -> Self {
        Self {
            calories: tolerance.band(target.calories),
            protein: tolerance.band(target.protein),
            carbs: tolerance.band(target.carbs),
            fat: tolerance.band(target.fat),
        }
    }
}

fn within(value: f64, target: f64, band: f64) -> bool {
    (value - target).abs() <= band
}

fn deviation(nutrition: &NutritionProfile, target: &NutritionProfile) -> f64 {
    (nutrition.calories - target.calories).abs() + (nutrition.protein - target.protein).abs()
}

pub fn match_by_nutrition(
    variants: &[VariantOption],
    target: &NutritionProfile,
    tolerance: Tolerance,
) -> NutritionMatches {
    let bands = Bands::around(target, tolerance);
    let mut matches = NutritionMatches::default();
    let mut close: Vec<(f64, usize)> = Vec::new();

    for (index, variant) in variants.iter().enumerate() {
        let nutrition = variant.nutrition();
        let exact = within(nutrition.calories, target.calories, bands.calories)
            && within(nutrition.protein, target.protein, bands.protein)
            && within(nutrition.carbs, target.carbs, bands.carbs)
            && within(nutrition.fat, target.fat, bands.fat);

        if exact {
            matches.exact_match.push(variant.clone());
        } else if within(
            nutrition.calories,
            target.calories,
            bands.calories * CLOSE_MATCH_FACTOR,
        ) && within(
            nutrition.protein,
            target.protein,
            bands.protein * CLOSE_MATCH_FACTOR,
        ) {
            close.push((deviation(nutrition, target), index));
        } else {
            matches.other_options.push(variant.clone());
        }
    }

    close.sort_by(|left, right| left.0.total_cmp(&right.0).then_with(|| left.1.cmp(&right.1)));
    matches.close_match = close
        .into_iter()
        .map(|(_, index)| variants[index].clone())
        .collect();

    matches
}
