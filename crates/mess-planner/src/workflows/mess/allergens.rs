use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::{AllergenId, VariantOption};

/// Catalogue split by a flat list of forbidden allergens.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AllergenPartition {
    pub safe: Vec<VariantOption>,
    #[serde(rename = "unsafe")]
    pub unsafe_variants: Vec<VariantOption>,
}

/// Coarse filter independent of any student's severity buckets.
pub fn filter_by_allergens(
    variants: &[VariantOption],
    allergen_ids: &BTreeSet<AllergenId>,
) -> AllergenPartition {
    let (unsafe_variants, safe) = variants
        .iter()
        .cloned()
        .partition(|variant| variant.contains_any(allergen_ids));

    AllergenPartition {
        safe,
        unsafe_variants,
    }
}
