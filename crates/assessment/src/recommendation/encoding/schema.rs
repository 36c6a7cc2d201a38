use super::super::domain::FEATURE_COUNT;

/// Client attribute columns in the order every model artifact was trained on.
pub const CLIENT_FEATURES: [&str; FEATURE_COUNT] = [
    "age",
    "gender",
    "work_experience",
    "canada_workex",
    "dep_num",
    "canada_born",
    "citizen_status",
    "level_of_schooling",
    "fluent_english",
    "reading_english_scale",
    "speaking_english_scale",
    "writing_english_scale",
    "numeracy_scale",
    "computer_scale",
    "transportation_bool",
    "caregiver_bool",
    "housing",
    "income_source",
    "felony_bool",
    "attending_school",
    "currently_employed",
    "substance_use",
    "time_unemployed",
    "need_mental_health_support_bool",
];

/// Fixed, ordered set of feature slots. The length is part of the type so a
/// schema can never drift away from [`FEATURE_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: &'static [&'static str; FEATURE_COUNT],
}

impl FeatureSchema {
    pub const fn standard() -> Self {
        Self {
            columns: &CLIENT_FEATURES,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.columns.get(index).copied()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| *column == name)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::standard()
    }
}
