use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for students in a cohort.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudentId(pub String);

/// Identifier wrapper for an offerable meal variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariantId(pub String);

/// Opaque allergen identifier shared by student profiles and recipes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AllergenId(pub String);

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for VariantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for AllergenId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AllergenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AllergenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dietary category a variant is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantType {
    Veg,
    NonVeg,
    Vegan,
}

impl VariantType {
    pub fn ordered() -> [VariantType; 3] {
        [VariantType::Veg, VariantType::NonVeg, VariantType::Vegan]
    }

    pub fn label(&self) -> &'static str {
        match self {
            VariantType::Veg => "Vegetarian",
            VariantType::NonVeg => "Non-vegetarian",
            VariantType::Vegan => "Vegan",
        }
    }
}

/// Dietary preference recorded on a student profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DietaryPreference {
    Veg,
    NonVeg,
    Vegan,
    Any,
}

impl DietaryPreference {
    pub fn ordered() -> [DietaryPreference; 4] {
        [
            DietaryPreference::Veg,
            DietaryPreference::NonVeg,
            DietaryPreference::Vegan,
            DietaryPreference::Any,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            DietaryPreference::Veg => "Vegetarian",
            DietaryPreference::NonVeg => "Non-vegetarian",
            DietaryPreference::Vegan => "Vegan",
            DietaryPreference::Any => "No preference",
        }
    }

    /// Whether a variant of the given category satisfies this preference outright.
    pub fn accepts(&self, variant_type: VariantType) -> bool {
        matches!(
            (self, variant_type),
            (DietaryPreference::Any, _)
                | (DietaryPreference::Veg, VariantType::Veg)
                | (DietaryPreference::NonVeg, VariantType::NonVeg)
                | (DietaryPreference::Vegan, VariantType::Vegan)
        )
    }
}

/// Macro-nutrient profile per serving.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionProfile {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutritionProfile {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Rejects non-finite or negative values, naming `owner` in the error.
    pub fn validate(&self, owner: &str) -> Result<(), ValidationError> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ];

        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidNutrition {
                    owner: owner.to_string(),
                    field,
                    value,
                });
            }
        }

        Ok(())
    }
}

/// Validation errors raised while constructing engine inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyIdentifier { field: &'static str },
    #[error("variant {variant_id} has invalid cost {cost} (must be finite and non-negative)")]
    InvalidCost { variant_id: String, cost: f64 },
    #[error("{owner} has invalid {field} value {value} (must be finite and non-negative)")]
    InvalidNutrition {
        owner: String,
        field: &'static str,
        value: f64,
    },
    #[error("tolerance percent {0} must be finite and non-negative")]
    Tolerance(f64),
    #[error("student {student_id} appears more than once in the cohort")]
    DuplicateStudent { student_id: StudentId },
}

/// Rejects a cohort that lists the same student id twice.
pub fn ensure_unique_students(students: &[StudentDietaryProfile]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for student in students {
        if !seen.insert(student.id()) {
            return Err(ValidationError::DuplicateStudent {
                student_id: student.id().clone(),
            });
        }
    }
    Ok(())
}

fn required_id(raw: String, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyIdentifier { field });
    }
    Ok(trimmed.to_string())
}

fn allergen_set<I, A>(ids: I) -> BTreeSet<AllergenId>
where
    I: IntoIterator<Item = A>,
    A: Into<AllergenId>,
{
    ids.into_iter()
        .map(Into::into)
        .map(|AllergenId(raw)| AllergenId(raw.trim().to_string()))
        .filter(|id| !id.0.is_empty())
        .collect()
}

/// Dietary snapshot for one student, supplied per matching call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StudentDietaryRecord")]
pub struct StudentDietaryProfile {
    student_id: StudentId,
    variant_preference: DietaryPreference,
    verified_allergy_ids: BTreeSet<AllergenId>,
    severe_allergy_ids: BTreeSet<AllergenId>,
    anaphylaxis_allergy_ids: BTreeSet<AllergenId>,
    custom_restrictions: Vec<String>,
}

impl StudentDietaryProfile {
    pub fn new(
        student_id: impl Into<String>,
        variant_preference: DietaryPreference,
    ) -> Result<Self, ValidationError> {
        let student_id = StudentId(required_id(student_id.into(), "studentId")?);
        Ok(Self {
            student_id,
            variant_preference,
            verified_allergy_ids: BTreeSet::new(),
            severe_allergy_ids: BTreeSet::new(),
            anaphylaxis_allergy_ids: BTreeSet::new(),
            custom_restrictions: Vec::new(),
        })
    }

    pub fn with_verified_allergies<I, A>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AllergenId>,
    {
        self.verified_allergy_ids = allergen_set(ids);
        self
    }

    pub fn with_severe_allergies<I, A>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AllergenId>,
    {
        self.severe_allergy_ids = allergen_set(ids);
        self
    }

    pub fn with_anaphylaxis_allergies<I, A>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AllergenId>,
    {
        self.anaphylaxis_allergy_ids = allergen_set(ids);
        self
    }

    pub fn with_custom_restrictions<I, S>(mut self, restrictions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_restrictions = restrictions.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &StudentId {
        &self.student_id
    }

    pub fn preference(&self) -> DietaryPreference {
        self.variant_preference
    }

    pub fn verified_allergy_ids(&self) -> &BTreeSet<AllergenId> {
        &self.verified_allergy_ids
    }

    pub fn severe_allergy_ids(&self) -> &BTreeSet<AllergenId> {
        &self.severe_allergy_ids
    }

    pub fn anaphylaxis_allergy_ids(&self) -> &BTreeSet<AllergenId> {
        &self.anaphylaxis_allergy_ids
    }

    /// Free-text restrictions carried through for reporting; no matching rule reads them.
    pub fn custom_restrictions(&self) -> &[String] {
        &self.custom_restrictions
    }

    /// True when any of the three severity buckets holds an allergen.
    pub fn has_allergy_entries(&self) -> bool {
        !(self.verified_allergy_ids.is_empty()
            && self.severe_allergy_ids.is_empty()
            && self.anaphylaxis_allergy_ids.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentDietaryRecord {
    student_id: String,
    variant_preference: DietaryPreference,
    #[serde(default)]
    verified_allergy_ids: Vec<String>,
    #[serde(default)]
    severe_allergy_ids: Vec<String>,
    #[serde(default)]
    anaphylaxis_allergy_ids: Vec<String>,
    #[serde(default)]
    custom_restrictions: Option<Vec<String>>,
}

impl TryFrom<StudentDietaryRecord> for StudentDietaryProfile {
    type Error = ValidationError;

    fn try_from(record: StudentDietaryRecord) -> Result<Self, Self::Error> {
        Ok(
            StudentDietaryProfile::new(record.student_id, record.variant_preference)?
                .with_verified_allergies(record.verified_allergy_ids)
                .with_severe_allergies(record.severe_allergy_ids)
                .with_anaphylaxis_allergies(record.anaphylaxis_allergy_ids)
                .with_custom_restrictions(record.custom_restrictions.unwrap_or_default()),
        )
    }
}

/// One offerable meal variant for a given meal and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "VariantRecord")]
pub struct VariantOption {
    variant_id: VariantId,
    variant_type: VariantType,
    recipe_name: String,
    cost: f64,
    allergens: BTreeSet<AllergenId>,
    nutrition: NutritionProfile,
}

impl VariantOption {
    pub fn new(
        variant_id: impl Into<String>,
        variant_type: VariantType,
        recipe_name: impl Into<String>,
        cost: f64,
        nutrition: NutritionProfile,
    ) -> Result<Self, ValidationError> {
        let variant_id = required_id(variant_id.into(), "variantId")?;

        if !cost.is_finite() || cost < 0.0 {
            return Err(ValidationError::InvalidCost { variant_id, cost });
        }
        nutrition.validate(&format!("variant {variant_id}"))?;

        Ok(Self {
            variant_id: VariantId(variant_id),
            variant_type,
            recipe_name: recipe_name.into(),
            cost,
            allergens: BTreeSet::new(),
            nutrition,
        })
    }

    pub fn with_allergens<I, A>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AllergenId>,
    {
        self.allergens = allergen_set(ids);
        self
    }

    pub fn id(&self) -> &VariantId {
        &self.variant_id
    }

    pub fn variant_type(&self) -> VariantType {
        self.variant_type
    }

    pub fn recipe_name(&self) -> &str {
        &self.recipe_name
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn allergens(&self) -> &BTreeSet<AllergenId> {
        &self.allergens
    }

    pub fn nutrition(&self) -> &NutritionProfile {
        &self.nutrition
    }

    /// True when the recipe carries at least one allergen from `ids`.
    pub fn contains_any(&self, ids: &BTreeSet<AllergenId>) -> bool {
        // iterate the smaller side; both are ordered sets
        if self.allergens.len() <= ids.len() {
            self.allergens.iter().any(|allergen| ids.contains(allergen))
        } else {
            ids.iter().any(|allergen| self.allergens.contains(allergen))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantRecord {
    variant_id: String,
    variant_type: VariantType,
    #[serde(default)]
    recipe_name: String,
    cost: f64,
    #[serde(default)]
    allergens: Vec<String>,
    nutrition: NutritionProfile,
}

impl TryFrom<VariantRecord> for VariantOption {
    type Error = ValidationError;

    fn try_from(record: VariantRecord) -> Result<Self, Self::Error> {
        Ok(VariantOption::new(
            record.variant_id,
            record.variant_type,
            record.recipe_name,
            record.cost,
            record.nutrition,
        )?
        .with_allergens(record.allergens))
    }
}

/// Percentage band applied to each macro when matching a nutrition target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerance(f64);

pub const DEFAULT_TOLERANCE_PERCENT: f64 = 10.0;

impl Tolerance {
    pub fn percent(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::Tolerance(value));
        }
        Ok(Self(value))
    }

    pub fn as_percent(&self) -> f64 {
        self.0
    }

    /// Absolute band around `target` for this tolerance.
    pub fn band(&self, target: f64) -> f64 {
        target * self.0 / 100.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(DEFAULT_TOLERANCE_PERCENT)
    }
}

/// Validated nutrition goal plus the tolerance it is matched with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTarget {
    profile: NutritionProfile,
    tolerance_percent: Tolerance,
}

impl NutritionTarget {
    pub fn new(profile: NutritionProfile, tolerance: Tolerance) -> Result<Self, ValidationError> {
        profile.validate("nutrition target")?;
        Ok(Self {
            profile,
            tolerance_percent: tolerance,
        })
    }

    pub fn profile(&self) -> &NutritionProfile {
        &self.profile
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance_percent
    }
}
