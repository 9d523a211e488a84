use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{StudentDietaryProfile, StudentId, VariantId, VariantOption};
use super::rounding::round_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MatrixSummary {
    pub safe: usize,
    #[serde(rename = "unsafe")]
    pub unsafe_cells: usize,
    pub percent: u32,
}

/// Allergen-only safety grid for audit reports; dietary preference is not consulted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CompatibilityMatrix {
    pub matrix: BTreeMap<StudentId, BTreeMap<VariantId, bool>>,
    pub summary: MatrixSummary,
}

impl CompatibilityMatrix {
    pub fn is_safe(&self, student: &StudentId, variant: &VariantId) -> Option<bool> {
        self.matrix.get(student)?.get(variant).copied()
    }
}

/// True when none of the three severity buckets intersect the recipe's allergens.
pub fn allergen_safe(student: &StudentDietaryProfile, variant: &VariantOption) -> bool {
    !(variant.contains_any(student.anaphylaxis_allergy_ids())
        || variant.contains_any(student.severe_allergy_ids())
        || variant.contains_any(student.verified_allergy_ids()))
}

/// Callers are expected to pass a cohort with unique ids (see [`ensure_unique_students`]);
/// if an id repeats, its cells combine so that any unsafe record keeps the pair unsafe.
///
/// [`ensure_unique_students`]: super::domain::ensure_unique_students
pub fn build_matrix(
    students: &[StudentDietaryProfile],
    variants: &[VariantOption],
) -> CompatibilityMatrix {
    let mut built = CompatibilityMatrix::default();

    for student in students {
        let row = built.matrix.entry(student.id().clone()).or_default();
        for variant in variants {
            let safe = allergen_safe(student, variant);
            row.entry(variant.id().clone())
                .and_modify(|cell| *cell &= safe)
                .or_insert(safe);
        }
    }

    let safe = built
        .matrix
        .values()
        .flat_map(BTreeMap::values)
        .filter(|cell| **cell)
        .count();
    let cells: usize = built.matrix.values().map(BTreeMap::len).sum();
    built.summary = MatrixSummary {
        safe,
        unsafe_cells: cells - safe,
        percent: round_percent(safe, cells),
    };
    built
}
