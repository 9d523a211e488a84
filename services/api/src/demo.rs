use chrono::{Local, NaiveDate};
use clap::Args;
use mess_planner::config::AppConfig;
use mess_planner::error::AppError;
use mess_planner::workflows::import::{CatalogueCsvImporter, CohortCsvImporter};
use mess_planner::workflows::mess::{
    build_matrix, CompatibilityMatrix, DietaryPreference, MealPlanReport, MealSlot,
    NutritionProfile, NutritionTarget, StudentDietaryProfile, Tolerance, ValidationError,
    VariantOption, VariantType,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Cohort CSV export (Student ID, Preference, allergy columns)
    #[arg(long)]
    pub(crate) students: PathBuf,
    /// Variant catalogue CSV export (Variant ID, Type, Recipe, Cost, Allergens, macros)
    #[arg(long)]
    pub(crate) variants: PathBuf,
    /// Meal date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) meal_date: Option<NaiveDate>,
    /// Meal slot: Breakfast, Lunch, Snacks or Dinner. Defaults to Lunch.
    #[arg(long, value_parser = crate::infra::parse_meal_slot)]
    pub(crate) meal_slot: Option<MealSlot>,
    /// Target calories per serving; requires the other three targets.
    #[arg(long, requires_all = ["target_protein", "target_carbs", "target_fat"])]
    pub(crate) target_calories: Option<f64>,
    /// Target protein (g) per serving
    #[arg(long, requires = "target_calories")]
    pub(crate) target_protein: Option<f64>,
    /// Target carbohydrates (g) per serving
    #[arg(long, requires = "target_calories")]
    pub(crate) target_carbs: Option<f64>,
    /// Target fat (g) per serving
    #[arg(long, requires = "target_calories")]
    pub(crate) target_fat: Option<f64>,
    /// Nutrition tolerance percent (defaults to MESS_NUTRITION_TOLERANCE_PERCENT or 10)
    #[arg(long)]
    pub(crate) tolerance: Option<f64>,
    /// Print the per-student allergen compatibility matrix
    #[arg(long)]
    pub(crate) matrix: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Meal date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) meal_date: Option<NaiveDate>,
    /// Meal slot: Breakfast, Lunch, Snacks or Dinner. Defaults to Lunch.
    #[arg(long, value_parser = crate::infra::parse_meal_slot)]
    pub(crate) meal_slot: Option<MealSlot>,
    /// Print the per-student allergen compatibility matrix
    #[arg(long)]
    pub(crate) matrix: bool,
}

pub(crate) fn run_plan_report(args: PlanArgs) -> Result<(), AppError> {
    let PlanArgs {
        students,
        variants,
        meal_date,
        meal_slot,
        target_calories,
        target_protein,
        target_carbs,
        target_fat,
        tolerance,
        matrix,
    } = args;

    let config = AppConfig::load()?;
    let cohort = CohortCsvImporter::from_path(&students)?;
    let catalogue = CatalogueCsvImporter::from_path(&variants)?;

    let tolerance = match tolerance {
        Some(value) => Tolerance::percent(value)?,
        None => config.planner.nutrition_tolerance,
    };
    let target = match (target_calories, target_protein, target_carbs, target_fat) {
        (Some(calories), Some(protein), Some(carbs), Some(fat)) => Some(NutritionTarget::new(
            NutritionProfile::new(calories, protein, carbs, fat),
            tolerance,
        )?),
        _ => None,
    };

    let meal_date = meal_date.unwrap_or_else(|| Local::now().date_naive());
    let report = MealPlanReport::build(
        meal_date,
        meal_slot.unwrap_or_default(),
        &cohort,
        &catalogue,
        target.as_ref(),
    );
    let matrix = matrix.then(|| build_matrix(&cohort, &catalogue));

    println!(
        "Data source: {} + {}",
        students.display(),
        variants.display()
    );
    render_meal_plan(&report, matrix.as_ref());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        meal_date,
        meal_slot,
        matrix,
    } = args;

    let cohort = sample_cohort()?;
    let catalogue = sample_catalogue()?;
    let target = NutritionTarget::new(
        NutritionProfile::new(600.0, 25.0, 60.0, 22.0),
        Tolerance::default(),
    )?;

    let meal_date = meal_date.unwrap_or_else(|| Local::now().date_naive());
    let report = MealPlanReport::build(
        meal_date,
        meal_slot.unwrap_or_default(),
        &cohort,
        &catalogue,
        Some(&target),
    );
    let matrix = matrix.then(|| build_matrix(&cohort, &catalogue));

    println!("Mess planning demo");
    println!("Data source: built-in sample cohort (no CSV exports provided)");
    render_meal_plan(&report, matrix.as_ref());
    Ok(())
}

pub(crate) fn sample_cohort() -> Result<Vec<StudentDietaryProfile>, ValidationError> {
    Ok(vec![
        StudentDietaryProfile::new("STU-101", DietaryPreference::Veg)?
            .with_verified_allergies(["dairy"]),
        StudentDietaryProfile::new("STU-102", DietaryPreference::NonVeg)?,
        StudentDietaryProfile::new("STU-103", DietaryPreference::Vegan)?
            .with_anaphylaxis_allergies(["peanut"]),
        StudentDietaryProfile::new("STU-104", DietaryPreference::Any)?
            .with_severe_allergies(["gluten"]),
        StudentDietaryProfile::new("STU-105", DietaryPreference::NonVeg)?
            .with_anaphylaxis_allergies(["shellfish"])
            .with_custom_restrictions(["no pork"]),
        StudentDietaryProfile::new("STU-106", DietaryPreference::Veg)?,
        StudentDietaryProfile::new("STU-107", DietaryPreference::Any)?,
        StudentDietaryProfile::new("STU-108", DietaryPreference::Vegan)?
            .with_verified_allergies(["soy"]),
    ])
}

pub(crate) fn sample_catalogue() -> Result<Vec<VariantOption>, ValidationError> {
    Ok(vec![
        VariantOption::new(
            "V-PANEER",
            VariantType::Veg,
            "Paneer butter masala",
            48.0,
            NutritionProfile::new(620.0, 24.0, 42.0, 38.0),
        )?
        .with_allergens(["dairy"]),
        VariantOption::new(
            "V-DAL",
            VariantType::Vegan,
            "Dal tadka with rice",
            32.0,
            NutritionProfile::new(590.0, 24.0, 64.0, 21.0),
        )?,
        VariantOption::new(
            "V-SATAY",
            VariantType::Vegan,
            "Tofu peanut satay",
            45.0,
            NutritionProfile::new(580.0, 26.0, 50.0, 28.0),
        )?
        .with_allergens(["peanut", "soy"]),
        VariantOption::new(
            "V-CHICKEN",
            VariantType::NonVeg,
            "Chicken curry with roti",
            62.0,
            NutritionProfile::new(680.0, 38.0, 55.0, 30.0),
        )?
        .with_allergens(["gluten"]),
        VariantOption::new(
            "V-PRAWN",
            VariantType::NonVeg,
            "Prawn masala",
            70.0,
            NutritionProfile::new(560.0, 34.0, 30.0, 26.0),
        )?
        .with_allergens(["shellfish"]),
    ])
}

pub(crate) fn render_meal_plan(report: &MealPlanReport, matrix: Option<&CompatibilityMatrix>) {
    let summary = report.summary();

    println!(
        "Meal plan for {} ({})",
        summary.meal_date, summary.meal_slot_label
    );
    println!(
        "Cohort: {} students, {} variants | {} acceptable slots, {} warnings, {} blocked",
        report.cohort.students,
        report.cohort.variants,
        report.cohort.total_acceptable_slots,
        report.cohort.warnings,
        report.cohort.blocked
    );
    println!(
        "Service level: {} ({}% coverage, {}/{} students)",
        summary.service_level_label,
        summary.coverage_percentage,
        summary.covered_students,
        summary.total_students
    );

    if report.selection.optimal.is_empty() {
        println!("\nOffered variants: none");
    } else {
        println!("\nOffered variants");
        for variant in &report.selection.optimal {
            println!(
                "- {} ({}): {}, {:.2} per serving",
                variant.id(),
                variant.variant_type().label(),
                variant.recipe_name(),
                variant.cost()
            );
        }
    }

    println!("\nVariant breakdown");
    for row in &summary.variant_rows {
        let offered = if row.offered { " [offered]" } else { "" };
        println!(
            "- {} | {} | {} | {} acceptable, {} warning, {} blocked{}",
            row.variant_id,
            row.recipe_name,
            row.variant_type_label,
            row.acceptable,
            row.warning,
            row.blocked,
            offered
        );
    }

    println!("\nPreference mix");
    for row in &summary.preference_rows {
        println!(
            "- {}: {} ({}%)",
            row.preference_label, row.count, row.percentage
        );
    }

    println!(
        "\nCost exposure: {:.2} total | {:.2} per student",
        report.cost.total_cost, summary.avg_cost_per_student
    );
    println!(
        "Allergen-safe pairs: {}% ({} safe, {} unsafe)",
        summary.allergen_safe_percent,
        report.compatibility.safe,
        report.compatibility.unsafe_cells
    );

    if let Some(nutrition) = &report.nutrition {
        println!("\nNutrition fit");
        for (label, variants) in [
            ("Exact", &nutrition.exact_match),
            ("Close", &nutrition.close_match),
            ("Other", &nutrition.other_options),
        ] {
            let ids: Vec<String> = variants.iter().map(|variant| variant.id().to_string()).collect();
            let listed = if ids.is_empty() {
                "none".to_string()
            } else {
                ids.join(", ")
            };
            println!("- {label}: {listed}");
        }
    }

    if !summary.recommendations.is_empty() {
        println!("\nRecommendations");
        for note in &summary.recommendations {
            println!("- {}", note);
        }
    }

    if let Some(matrix) = matrix {
        println!("\nAllergen compatibility");
        for (student, row) in &matrix.matrix {
            let cells: Vec<String> = row
                .iter()
                .map(|(variant, safe)| {
                    format!("{variant} {}", if *safe { "safe" } else { "unsafe" })
                })
                .collect();
            println!("- {}: {}", student, cells.join(", "));
        }
    }
}
