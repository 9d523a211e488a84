use crate::workflows::mess::domain::{DietaryPreference, VariantType};

fn normalize_token(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}

pub(crate) fn parse_preference(value: &str) -> Option<DietaryPreference> {
    match normalize_token(value).as_str() {
        "veg" | "vegetarian" => Some(DietaryPreference::Veg),
        "non_veg" | "nonveg" | "non_vegetarian" => Some(DietaryPreference::NonVeg),
        "vegan" => Some(DietaryPreference::Vegan),
        "any" | "" => Some(DietaryPreference::Any),
        _ => None,
    }
}

pub(crate) fn parse_variant_type(value: &str) -> Option<VariantType> {
    match normalize_token(value).as_str() {
        "veg" | "vegetarian" => Some(VariantType::Veg),
        "non_veg" | "nonveg" | "non_vegetarian" => Some(VariantType::NonVeg),
        "vegan" => Some(VariantType::Vegan),
        _ => None,
    }
}

/// Splits a `;`-separated cell into trimmed, non-empty entries.
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
