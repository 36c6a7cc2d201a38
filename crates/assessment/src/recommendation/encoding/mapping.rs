use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named lookup from raw text to a canonical integer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    pub name: String,
    pub entries: BTreeMap<String, i64>,
}

impl LookupTable {
    pub fn new<'a>(name: &str, entries: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        Self {
            name: name.to_string(),
            entries: entries
                .into_iter()
                .map(|(text, code)| (text.to_string(), code))
                .collect(),
        }
    }
}

/// One step of text resolution. Rules run in list order and the first match wins,
/// so a string present in two tables always resolves through the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MappingRule {
    Table(LookupTable),
    /// Non-empty ASCII digit strings parse as integers.
    NumericText,
}

impl MappingRule {
    fn apply(&self, text: &str) -> Option<Resolution> {
        match self {
            MappingRule::Table(table) => table.entries.get(text).copied().map(Resolution::Mapped),
            MappingRule::NumericText => {
                if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
                    return None;
                }
                text.parse::<i64>().ok().map(Resolution::Parsed)
            }
        }
    }
}

/// Result of resolving one text value. Every input lands in exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Mapped(i64),
    Parsed(i64),
    Unresolved(String),
}

impl Resolution {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Resolution::Mapped(code) | Resolution::Parsed(code) => Some(*code as f64),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// Ordered categorical rules applied to textual attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalMapping {
    rules: Vec<MappingRule>,
}

impl CategoricalMapping {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    /// Boolean words, schooling, housing and income-source tables followed by
    /// numeric-text parsing.
    pub fn standard() -> Self {
        Self::new(vec![
            MappingRule::Table(LookupTable::new(
                "boolean",
                [
                    ("yes", 1),
                    ("no", 0),
                    ("true", 1),
                    ("false", 0),
                    ("", 0),
                    ("Yes", 1),
                    ("No", 0),
                ],
            )),
            MappingRule::Table(LookupTable::new(
                "level_of_schooling",
                [("Grade 0-8", 1), ("Post graduate", 14)],
            )),
            MappingRule::Table(LookupTable::new(
                "housing",
                [("Renting-private", 1), ("Emergency hostel", 10)],
            )),
            MappingRule::Table(LookupTable::new(
                "income_source",
                [("No Source of Income", 1), ("Other (specify)", 10)],
            )),
            MappingRule::NumericText,
        ])
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn resolve(&self, text: &str) -> Resolution {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text))
            .unwrap_or_else(|| Resolution::Unresolved(text.to_string()))
    }
}

impl Default for CategoricalMapping {
    fn default() -> Self {
        Self::standard()
    }
}
