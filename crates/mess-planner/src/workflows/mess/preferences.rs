use serde::Serialize;

use super::domain::{DietaryPreference, StudentDietaryProfile};
use super::rounding::round_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PreferenceShare {
    pub count: usize,
    pub percentage: u32,
}

/// Raw dietary-preference distribution of a cohort, ignoring allergens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PreferenceProfile {
    pub veg: PreferenceShare,
    pub non_veg: PreferenceShare,
    pub vegan: PreferenceShare,
    pub any: PreferenceShare,
    #[serde(rename = "total")]
    pub total: usize,
}

impl PreferenceProfile {
    pub fn share(&self, preference: DietaryPreference) -> PreferenceShare {
        match preference {
            DietaryPreference::Veg => self.veg,
            DietaryPreference::NonVeg => self.non_veg,
            DietaryPreference::Vegan => self.vegan,
            DietaryPreference::Any => self.any,
        }
    }

    fn share_mut(&mut self, preference: DietaryPreference) -> &mut PreferenceShare {
        match preference {
            DietaryPreference::Veg => &mut self.veg,
            DietaryPreference::NonVeg => &mut self.non_veg,
            DietaryPreference::Vegan => &mut self.vegan,
            DietaryPreference::Any => &mut self.any,
        }
    }
}

pub fn profile_preferences(students: &[StudentDietaryProfile]) -> PreferenceProfile {
    let mut profile = PreferenceProfile {
        total: students.len(),
        ..PreferenceProfile::default()
    };

    for student in students {
        profile.share_mut(student.preference()).count += 1;
    }

    for preference in DietaryPreference::ordered() {
        let share = profile.share_mut(preference);
        share.percentage = round_percent(share.count, students.len());
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohort(preferences: &[DietaryPreference]) -> Vec<StudentDietaryProfile> {
        preferences
            .iter()
            .enumerate()
            .map(|(index, preference)| {
                StudentDietaryProfile::new(format!("s{index}"), *preference).expect("valid student")
            })
            .collect()
    }

    #[test]
    fn tallies_counts_and_rounded_percentages() {
        use DietaryPreference::*;
        let students = cohort(&[Veg, Veg, NonVeg, Vegan, Any, Any, Any]);

        let profile = profile_preferences(&students);

        assert_eq!(profile.total, 7);
        assert_eq!(profile.veg, PreferenceShare { count: 2, percentage: 29 });
        assert_eq!(profile.non_veg, PreferenceShare { count: 1, percentage: 14 });
        assert_eq!(profile.vegan.count, 1);
        assert_eq!(profile.share(Any), PreferenceShare { count: 3, percentage: 43 });
    }

    #[test]
    fn empty_cohort_yields_zero_percentages() {
        let profile = profile_preferences(&[]);
        for preference in DietaryPreference::ordered() {
            assert_eq!(profile.share(preference), PreferenceShare::default());
        }
    }

    #[test]
    fn serializes_with_category_keys() {
        let students = cohort(&[DietaryPreference::NonVeg]);
        let value = serde_json::to_value(profile_preferences(&students)).expect("serializes");
        assert_eq!(value["NON_VEG"]["count"], 1);
        assert_eq!(value["NON_VEG"]["percentage"], 100);
        assert_eq!(value["total"], 1);
    }
}
