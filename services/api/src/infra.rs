use chrono::NaiveDate;
use mess_planner::workflows::mess::MealSlot;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_meal_slot(raw: &str) -> Result<MealSlot, String> {
    MealSlot::parse(raw).ok_or_else(|| {
        let known: Vec<_> = MealSlot::ordered().into_iter().map(MealSlot::label).collect();
        format!("unknown meal slot '{raw}' (expected one of {})", known.join(", "))
    })
}
