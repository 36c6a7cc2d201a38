//! Conversion of raw client attributes into the fixed feature layout.

mod mapping;
mod schema;

pub use mapping::{CategoricalMapping, LookupTable, MappingRule, Resolution};
pub use schema::{FeatureSchema, CLIENT_FEATURES};

use std::fmt;
use std::str::FromStr;

use super::domain::{AttributeValue, BaselineVector, FeatureVector, RawAttributes};

/// Raised when an attribute cannot be represented as a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("attribute `{feature}` is missing")]
    Missing { feature: &'static str },
    #[error("attribute `{feature}` has unmappable value {value:?}")]
    Unmappable { feature: &'static str, value: String },
    #[error("attribute `{feature}` is not a finite number")]
    NonFinite { feature: &'static str },
}

impl EncodingError {
    pub fn feature(&self) -> &'static str {
        match self {
            EncodingError::Missing { feature }
            | EncodingError::Unmappable { feature, .. }
            | EncodingError::NonFinite { feature } => *feature,
        }
    }
}

/// Encodes raw attributes against a schema and a categorical mapping.
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
    mapping: CategoricalMapping,
}

impl FeatureEncoder {
    pub fn new(schema: FeatureSchema, mapping: CategoricalMapping) -> Self {
        Self { schema, mapping }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn mapping(&self) -> &CategoricalMapping {
        &self.mapping
    }

    /// Encodes every schema slot. Absent keys and JSON nulls become `None`;
    /// keys outside the schema are ignored.
    pub fn encode(&self, raw: &RawAttributes) -> Result<FeatureVector, EncodingError> {
        let slots = self
            .schema
            .columns()
            .iter()
            .map(|&feature| match raw.get(feature) {
                None | Some(AttributeValue::Null) => Ok(None),
                Some(value) => self.encode_value(feature, value).map(Some),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FeatureVector::from_slots(slots))
    }

    fn encode_value(
        &self,
        feature: &'static str,
        value: &AttributeValue,
    ) -> Result<f64, EncodingError> {
        match value {
            AttributeValue::Bool(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
            AttributeValue::Number(number) if number.is_finite() => Ok(*number),
            AttributeValue::Number(_) => Err(EncodingError::NonFinite { feature }),
            AttributeValue::Text(text) => match self.mapping.resolve(text) {
                Resolution::Mapped(code) | Resolution::Parsed(code) => Ok(code as f64),
                Resolution::Unresolved(value) => Err(EncodingError::Unmappable { feature, value }),
            },
            AttributeValue::Null => Err(EncodingError::Missing { feature }),
            AttributeValue::Other(other) => Err(EncodingError::Unmappable {
                feature,
                value: other.to_string(),
            }),
        }
    }
}

/// How missing slots are handled when an encoded vector becomes a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MissingValuePolicy {
    #[default]
    Reject,
    Fill(f64),
}

impl MissingValuePolicy {
    pub fn apply(
        &self,
        vector: &FeatureVector,
        schema: &FeatureSchema,
    ) -> Result<BaselineVector, EncodingError> {
        let values = vector
            .slots()
            .iter()
            .zip(schema.columns())
            .map(|(slot, &feature)| match (slot, self) {
                (Some(value), _) => Ok(*value),
                (None, MissingValuePolicy::Fill(default)) => Ok(*default),
                (None, MissingValuePolicy::Reject) => Err(EncodingError::Missing { feature }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BaselineVector::new(values))
    }
}

impl fmt::Display for MissingValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingValuePolicy::Reject => f.write_str("reject"),
            MissingValuePolicy::Fill(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for MissingValuePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("reject") {
            return Ok(Self::Reject);
        }
        match trimmed.parse::<f64>() {
            Ok(fill) if fill.is_finite() => Ok(Self::Fill(fill)),
            _ => Err(format!(
                "expected `reject` or a finite number, found {trimmed:?}"
            )),
        }
    }
}
