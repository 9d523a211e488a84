use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::report::views::MealPlanSummary;
use super::{
    analyze_cost, build_matrix, ensure_unique_students, filter_by_allergens, match_by_nutrition,
    match_cohort, profile_preferences, select_optimal, AllergenId, AllergenPartition, CohortMatch,
    CompatibilityMatrix, CostAnalysis, MealPlanReport, MealSlot, NutritionMatches,
    NutritionProfile, NutritionTarget, OptimalSelection, PreferenceProfile,
    StudentDietaryProfile, Tolerance, VariantOption,
};
use crate::config::PlannerConfig;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct CohortRequest {
    pub students: Vec<StudentDietaryProfile>,
    pub variants: Vec<VariantOption>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreferencesRequest {
    pub students: Vec<StudentDietaryProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllergenFilterRequest {
    pub variants: Vec<VariantOption>,
    pub allergen_ids: BTreeSet<AllergenId>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRequest {
    pub variants: Vec<VariantOption>,
    pub target: NutritionProfile,
    #[serde(default)]
    pub tolerance_percent: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    #[serde(default)]
    pub meal_date: Option<NaiveDate>,
    #[serde(default)]
    pub meal_slot: MealSlot,
    pub students: Vec<StudentDietaryProfile>,
    pub variants: Vec<VariantOption>,
    #[serde(default)]
    pub nutrition_target: Option<NutritionProfile>,
    #[serde(default)]
    pub tolerance_percent: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MealPlanResponse {
    pub report: MealPlanReport,
    pub summary: MealPlanSummary,
}

/// Router builder exposing the planning operations as JSON endpoints.
pub fn mess_router(config: PlannerConfig) -> Router {
    Router::new()
        .route("/api/v1/mess/match", post(match_handler))
        .route("/api/v1/mess/optimal", post(optimal_handler))
        .route("/api/v1/mess/preferences", post(preferences_handler))
        .route("/api/v1/mess/allergen-filter", post(allergen_filter_handler))
        .route("/api/v1/mess/nutrition", post(nutrition_handler))
        .route("/api/v1/mess/cost", post(cost_handler))
        .route("/api/v1/mess/matrix", post(matrix_handler))
        .route("/api/v1/mess/plan", post(plan_handler))
        .with_state(Arc::new(config))
}

fn resolve_tolerance(
    config: &PlannerConfig,
    tolerance_percent: Option<f64>,
) -> Result<Tolerance, AppError> {
    match tolerance_percent {
        Some(value) => Ok(Tolerance::percent(value)?),
        None => Ok(config.nutrition_tolerance),
    }
}

pub(crate) async fn match_handler(
    Json(request): Json<CohortRequest>,
) -> Result<Json<CohortMatch>, AppError> {
    ensure_unique_students(&request.students)?;
    Ok(Json(match_cohort(&request.students, &request.variants)))
}

pub(crate) async fn optimal_handler(
    Json(request): Json<CohortRequest>,
) -> Result<Json<OptimalSelection>, AppError> {
    ensure_unique_students(&request.students)?;
    Ok(Json(select_optimal(&request.students, &request.variants)))
}

pub(crate) async fn preferences_handler(
    Json(request): Json<PreferencesRequest>,
) -> Result<Json<PreferenceProfile>, AppError> {
    ensure_unique_students(&request.students)?;
    Ok(Json(profile_preferences(&request.students)))
}

pub(crate) async fn allergen_filter_handler(
    Json(request): Json<AllergenFilterRequest>,
) -> Json<AllergenPartition> {
    Json(filter_by_allergens(&request.variants, &request.allergen_ids))
}

pub(crate) async fn nutrition_handler(
    State(config): State<Arc<PlannerConfig>>,
    Json(request): Json<NutritionRequest>,
) -> Result<Json<NutritionMatches>, AppError> {
    let tolerance = resolve_tolerance(&config, request.tolerance_percent)?;
    let target = NutritionTarget::new(request.target, tolerance)?;
    Ok(Json(match_by_nutrition(
        &request.variants,
        target.profile(),
        target.tolerance(),
    )))
}

pub(crate) async fn cost_handler(
    Json(request): Json<CohortRequest>,
) -> Result<Json<CostAnalysis>, AppError> {
    ensure_unique_students(&request.students)?;
    Ok(Json(analyze_cost(&request.students, &request.variants)))
}

pub(crate) async fn matrix_handler(
    Json(request): Json<CohortRequest>,
) -> Result<Json<CompatibilityMatrix>, AppError> {
    ensure_unique_students(&request.students)?;
    Ok(Json(build_matrix(&request.students, &request.variants)))
}

pub(crate) async fn plan_handler(
    State(config): State<Arc<PlannerConfig>>,
    Json(request): Json<MealPlanRequest>,
) -> Result<Json<MealPlanResponse>, AppError> {
    let MealPlanRequest {
        meal_date,
        meal_slot,
        students,
        variants,
        nutrition_target,
        tolerance_percent,
    } = request;

    ensure_unique_students(&students)?;
    let tolerance = resolve_tolerance(&config, tolerance_percent)?;
    let target = nutrition_target
        .map(|profile| NutritionTarget::new(profile, tolerance))
        .transpose()?;
    let meal_date = meal_date.unwrap_or_else(|| Local::now().date_naive());

    let report = MealPlanReport::build(meal_date, meal_slot, &students, &variants, target.as_ref());
    let summary = report.summary();

    Ok(Json(MealPlanResponse { report, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn cohort_payload() -> Value {
        json!({
            "students": [
                {
                    "studentId": "s1",
                    "variantPreference": "VEG",
                    "anaphylaxisAllergyIds": ["peanut"],
                    "verifiedAllergyIds": ["dairy"]
                },
                { "studentId": "s2", "variantPreference": "NON_VEG" }
            ],
            "variants": [
                {
                    "variantId": "satay",
                    "variantType": "VEG",
                    "recipeName": "Peanut satay",
                    "cost": 40.0,
                    "allergens": ["peanut", "dairy"],
                    "nutrition": { "calories": 500.0, "protein": 30.0, "carbs": 50.0, "fat": 20.0 }
                },
                {
                    "variantId": "chicken",
                    "variantType": "NON_VEG",
                    "recipeName": "Chicken curry",
                    "cost": 60.0,
                    "allergens": [],
                    "nutrition": { "calories": 620.0, "protein": 34.0, "carbs": 45.0, "fat": 26.0 }
                }
            ]
        })
    }

    async fn post_json(uri: &str, payload: Value) -> Response {
        mess_router(PlannerConfig::default())
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes")
    }

    async fn read_json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn match_route_partitions_cohort() {
        let response = post_json("/api/v1/mess/match", cohort_payload()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json_body(response).await;
        assert_eq!(body["matches"][0]["studentId"], "s1");
        assert_eq!(body["matches"][0]["blocked"][0]["variantId"], "satay");
        assert_eq!(body["matches"][0]["safe"][0]["variantId"], "chicken");
        assert_eq!(body["totalAcceptableSlots"], 3);
        assert_eq!(body["blocked"], 1);
    }

    #[tokio::test]
    async fn optimal_route_reports_coverage() {
        let response = post_json("/api/v1/mess/optimal", cohort_payload()).await;
        let body = read_json_body(response).await;

        assert_eq!(body["coverage"]["percentage"], 100);
        assert_eq!(body["optimal"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn cost_route_returns_camel_case_fields() {
        let response = post_json("/api/v1/mess/cost", cohort_payload()).await;
        let body = read_json_body(response).await;

        assert_eq!(body["totalCost"], 160.0);
        assert_eq!(body["avgCostPerStudent"], 80.0);
        assert_eq!(body["costPerVariant"]["chicken"], 120.0);
    }

    #[tokio::test]
    async fn nutrition_route_rejects_negative_tolerance() {
        let payload = json!({
            "variants": cohort_payload()["variants"].clone(),
            "target": { "calories": 500.0, "protein": 30.0, "carbs": 50.0, "fat": 20.0 },
            "tolerancePercent": -5.0
        });

        let response = post_json("/api/v1/mess/nutrition", payload).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json_body(response).await;
        assert!(body["error"].as_str().unwrap_or_default().contains("tolerance"));
    }

    #[tokio::test]
    async fn nutrition_route_uses_configured_tolerance() {
        let payload = json!({
            "variants": cohort_payload()["variants"].clone(),
            "target": { "calories": 500.0, "protein": 30.0, "carbs": 50.0, "fat": 20.0 }
        });

        let body = read_json_body(post_json("/api/v1/mess/nutrition", payload).await).await;
        assert_eq!(body["exactMatch"][0]["variantId"], "satay");
        assert_eq!(body["otherOptions"][0]["variantId"], "chicken");
    }

    #[tokio::test]
    async fn invalid_variant_is_rejected_at_the_boundary() {
        let mut payload = cohort_payload();
        payload["variants"][0]["cost"] = json!(-10.0);

        let response = post_json("/api/v1/mess/matrix", payload).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn repeated_student_id_is_rejected() {
        let mut payload = cohort_payload();
        payload["students"][1]["studentId"] = json!("s1");

        for uri in ["/api/v1/mess/matrix", "/api/v1/mess/optimal", "/api/v1/mess/plan"] {
            let response = post_json(uri, payload.clone()).await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            let body = read_json_body(response).await;
            assert!(body["error"]
                .as_str()
                .unwrap_or_default()
                .contains("student s1 appears more than once"));
        }
    }

    #[tokio::test]
    async fn allergen_filter_route_splits_catalogue() {
        let payload = json!({
            "variants": cohort_payload()["variants"].clone(),
            "allergenIds": ["peanut"]
        });

        let body = read_json_body(post_json("/api/v1/mess/allergen-filter", payload).await).await;
        assert_eq!(body["unsafe"][0]["variantId"], "satay");
        assert_eq!(body["safe"][0]["variantId"], "chicken");
    }

    #[tokio::test]
    async fn plan_route_returns_report_and_summary() {
        let mut payload = cohort_payload();
        payload["mealDate"] = json!("2025-11-03");
        payload["mealSlot"] = json!("dinner");
        payload["nutritionTarget"] =
            json!({ "calories": 600.0, "protein": 32.0, "carbs": 48.0, "fat": 24.0 });

        let response = post_json("/api/v1/mess/plan", payload).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json_body(response).await;
        assert_eq!(body["report"]["mealDate"], "2025-11-03");
        assert_eq!(body["summary"]["meal_slot_label"], "Dinner");
        assert_eq!(body["summary"]["variant_rows"].as_array().map(Vec::len), Some(2));
        assert!(body["report"]["nutrition"].is_object());
    }
}
