use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct CohortRow {
    #[serde(rename = "Student ID")]
    pub(crate) student_id: String,
    #[serde(rename = "Preference", default)]
    pub(crate) preference: String,
    #[serde(
        rename = "Verified Allergies",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) verified: Option<String>,
    #[serde(
        rename = "Severe Allergies",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) severe: Option<String>,
    #[serde(
        rename = "Anaphylaxis Allergies",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) anaphylaxis: Option<String>,
    #[serde(
        rename = "Custom Restrictions",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) custom: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogueRow {
    #[serde(rename = "Variant ID")]
    pub(crate) variant_id: String,
    #[serde(rename = "Type")]
    pub(crate) variant_type: String,
    #[serde(rename = "Recipe", default)]
    pub(crate) recipe: String,
    #[serde(rename = "Cost")]
    pub(crate) cost: f64,
    #[serde(rename = "Allergens", default, deserialize_with = "empty_string_as_none")]
    pub(crate) allergens: Option<String>,
    #[serde(rename = "Calories")]
    pub(crate) calories: f64,
    #[serde(rename = "Protein")]
    pub(crate) protein: f64,
    #[serde(rename = "Carbs")]
    pub(crate) carbs: f64,
    #[serde(rename = "Fat")]
    pub(crate) fat: f64,
}

/// Deserializes every row, pairing it with the 1-based line number where the row starts.
pub(crate) fn parse_rows<R, T>(reader: R) -> Result<Vec<(usize, T)>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    // Quoted cells may span lines, so the reader's position is the only reliable line number.
    while csv_reader.read_record(&mut record)? {
        let line = record
            .position()
            .map_or(0, |position| position.line() as usize);
        rows.push((line, record.deserialize(Some(&headers))?));
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
