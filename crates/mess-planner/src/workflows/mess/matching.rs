use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{StudentDietaryProfile, StudentId, VariantOption};

/// Bucket a variant lands in for one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBucket {
    Recommended,
    Safe,
    Warning,
    Blocked,
}

impl MatchBucket {
    pub fn is_acceptable(&self) -> bool {
        matches!(self, MatchBucket::Recommended | MatchBucket::Safe)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchBucket::Recommended => "Recommended",
            MatchBucket::Safe => "Safe",
            MatchBucket::Warning => "Warning",
            MatchBucket::Blocked => "Blocked",
        }
    }
}

/// Severity-first classification of a single student/variant pair.
///
/// Anaphylaxis overrides severe, which overrides verified; preference is only
/// consulted once no allergen bucket intersects the recipe.
pub fn classify(student: &StudentDietaryProfile, variant: &VariantOption) -> MatchBucket {
    if variant.contains_any(student.anaphylaxis_allergy_ids()) {
        MatchBucket::Blocked
    } else if variant.contains_any(student.severe_allergy_ids()) {
        MatchBucket::Warning
    } else if variant.contains_any(student.verified_allergy_ids()) {
        MatchBucket::Warning
    } else if student.preference().accepts(variant.variant_type()) {
        MatchBucket::Recommended
    } else {
        MatchBucket::Safe
    }
}

/// Partition of a catalogue for one student. Every variant appears in exactly one list,
/// in catalogue order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub student_id: StudentId,
    pub recommended: Vec<VariantOption>,
    pub safe: Vec<VariantOption>,
    pub warning: Vec<VariantOption>,
    pub blocked: Vec<VariantOption>,
}

impl MatchResult {
    fn empty(student_id: StudentId) -> Self {
        Self {
            student_id,
            recommended: Vec::new(),
            safe: Vec::new(),
            warning: Vec::new(),
            blocked: Vec::new(),
        }
    }

    /// `recommended` followed by `safe`.
    pub fn acceptable(&self) -> impl Iterator<Item = &VariantOption> {
        self.recommended.iter().chain(self.safe.iter())
    }

    pub fn acceptable_count(&self) -> usize {
        self.recommended.len() + self.safe.len()
    }

    pub fn bucket_of(&self, variant: &VariantOption) -> Option<MatchBucket> {
        let id = variant.id();
        [
            (MatchBucket::Recommended, &self.recommended),
            (MatchBucket::Safe, &self.safe),
            (MatchBucket::Warning, &self.warning),
            (MatchBucket::Blocked, &self.blocked),
        ]
        .into_iter()
        .find(|(_, variants)| variants.iter().any(|candidate| candidate.id() == id))
        .map(|(bucket, _)| bucket)
    }
}

pub fn match_student(student: &StudentDietaryProfile, variants: &[VariantOption]) -> MatchResult {
    let mut result = MatchResult::empty(student.id().clone());

    for variant in variants {
        let slot = match classify(student, variant) {
            MatchBucket::Recommended => &mut result.recommended,
            MatchBucket::Safe => &mut result.safe,
            MatchBucket::Warning => &mut result.warning,
            MatchBucket::Blocked => &mut result.blocked,
        };
        slot.push(variant.clone());
    }

    result
}

/// Per-student matches plus flat slot counts across the cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortMatch {
    pub matches: Vec<MatchResult>,
    /// Sum over students of acceptable-variant counts, not a distinct-student count.
    pub total_acceptable_slots: usize,
    pub blocked: usize,
    pub warnings: usize,
}

pub fn match_cohort(students: &[StudentDietaryProfile], variants: &[VariantOption]) -> CohortMatch {
    let matches: Vec<MatchResult> = students
        .iter()
        .map(|student| match_student(student, variants))
        .collect();

    let total_acceptable_slots = matches.iter().map(MatchResult::acceptable_count).sum();
    let blocked = matches.iter().map(|result| result.blocked.len()).sum();
    let warnings = matches.iter().map(|result| result.warning.len()).sum();

    debug!(
        students = students.len(),
        variants = variants.len(),
        total_acceptable_slots,
        blocked,
        warnings,
        "matched cohort against variant catalogue"
    );

    CohortMatch {
        matches,
        total_acceptable_slots,
        blocked,
        warnings,
    }
}
