//! CSV import for cohort and catalogue exports from the school-management system.

mod normalizer;
mod parser;

use crate::workflows::mess::domain::{
    NutritionProfile, StudentDietaryProfile, ValidationError, VariantOption,
};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use parser::{CatalogueRow, CohortRow};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unrecognized {field} '{value}'")]
    UnknownValue {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: ValidationError,
    },
}

pub struct CohortCsvImporter;

impl CohortCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<StudentDietaryProfile>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<StudentDietaryProfile>, ImportError> {
        let mut seen = BTreeSet::new();
        let mut cohort = Vec::new();

        for (line, row) in parser::parse_rows::<_, CohortRow>(reader)? {
            let profile = cohort_profile(line, row)?;
            if !seen.insert(profile.id().clone()) {
                return Err(ImportError::Invalid {
                    line,
                    source: ValidationError::DuplicateStudent {
                        student_id: profile.id().clone(),
                    },
                });
            }
            cohort.push(profile);
        }

        Ok(cohort)
    }
}

fn cohort_profile(line: usize, row: CohortRow) -> Result<StudentDietaryProfile, ImportError> {
    let preference =
        normalizer::parse_preference(&row.preference).ok_or_else(|| ImportError::UnknownValue {
            line,
            field: "Preference",
            value: row.preference.clone(),
        })?;

    let profile = StudentDietaryProfile::new(row.student_id, preference)
        .map_err(|source| ImportError::Invalid { line, source })?
        .with_verified_allergies(normalizer::split_list(row.verified.as_deref()))
        .with_severe_allergies(normalizer::split_list(row.severe.as_deref()))
        .with_anaphylaxis_allergies(normalizer::split_list(row.anaphylaxis.as_deref()))
        .with_custom_restrictions(normalizer::split_list(row.custom.as_deref()));

    Ok(profile)
}

pub struct CatalogueCsvImporter;

impl CatalogueCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<VariantOption>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<VariantOption>, ImportError> {
        parser::parse_rows::<_, CatalogueRow>(reader)?
            .into_iter()
            .map(|(line, row)| catalogue_variant(line, row))
            .collect()
    }
}

fn catalogue_variant(line: usize, row: CatalogueRow) -> Result<VariantOption, ImportError> {
    let variant_type =
        normalizer::parse_variant_type(&row.variant_type).ok_or_else(|| {
            ImportError::UnknownValue {
                line,
                field: "Type",
                value: row.variant_type.clone(),
            }
        })?;

    let nutrition = NutritionProfile::new(row.calories, row.protein, row.carbs, row.fat);
    let variant = VariantOption::new(row.variant_id, variant_type, row.recipe, row.cost, nutrition)
        .map_err(|source| ImportError::Invalid { line, source })?
        .with_allergens(normalizer::split_list(row.allergens.as_deref()));

    Ok(variant)
}
