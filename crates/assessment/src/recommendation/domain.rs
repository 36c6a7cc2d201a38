use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of client-attribute slots in every encoded vector.
pub const FEATURE_COUNT: usize = 24;

/// Number of service flags appended to a client vector when building a model row.
pub const INTERVENTION_COUNT: usize = 7;

/// Column count of every row handed to a scoring model.
pub const MODEL_INPUT_WIDTH: usize = FEATURE_COUNT + INTERVENTION_COUNT;

/// A single raw attribute as supplied by the caller.
///
/// Arrays and objects land in `Other` so that extra keys never fail a request;
/// they only become an encoding error when they occupy a schema slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Flat attribute mapping describing one client, equivalent to a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAttributes(BTreeMap<String, AttributeValue>);

impl RawAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawAttributes
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Support service the recommender is allowed to switch on or off.
///
/// Declaration order is the column order of the flags in a model row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionDimension {
    EmploymentAssistance,
    LifeStabilization,
    RetentionServices,
    SpecializedServices,
    EmploymentRelatedFinancialSupports,
    EmployerFinancialSupports,
    EnhancedReferrals,
}

impl InterventionDimension {
    pub const ALL: [InterventionDimension; INTERVENTION_COUNT] = [
        InterventionDimension::EmploymentAssistance,
        InterventionDimension::LifeStabilization,
        InterventionDimension::RetentionServices,
        InterventionDimension::SpecializedServices,
        InterventionDimension::EmploymentRelatedFinancialSupports,
        InterventionDimension::EmployerFinancialSupports,
        InterventionDimension::EnhancedReferrals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InterventionDimension::EmploymentAssistance => "employment_assistance",
            InterventionDimension::LifeStabilization => "life_stabilization",
            InterventionDimension::RetentionServices => "retention_services",
            InterventionDimension::SpecializedServices => "specialized_services",
            InterventionDimension::EmploymentRelatedFinancialSupports => {
                "employment_related_financial_supports"
            }
            InterventionDimension::EmployerFinancialSupports => "employer_financial_supports",
            InterventionDimension::EnhancedReferrals => "enhanced_referrals",
        }
    }

    /// Offset of this flag within the intervention block of a model row.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for InterventionDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown intervention `{0}`")]
pub struct UnknownIntervention(pub String);

impl FromStr for InterventionDimension {
    type Err = UnknownIntervention;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|dimension| dimension.name() == trimmed)
            .ok_or_else(|| UnknownIntervention(trimmed.to_string()))
    }
}

/// Encoded client attributes in schema order. Missing slots stay `None` so the
/// consumer decides whether to reject or fill them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    slots: Vec<Option<f64>>,
}

impl FeatureVector {
    pub(crate) fn from_slots(slots: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(slots.len(), FEATURE_COUNT);
        Self { slots }
    }

    pub fn slots(&self) -> &[Option<f64>] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.slots.get(index).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

/// Fully numeric client vector with no interventions applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineVector {
    values: Vec<f64>,
}

impl BaselineVector {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), FEATURE_COUNT);
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Model row for this client with exactly `enabled` switched on.
    pub fn scenario_row(&self, enabled: &[InterventionDimension]) -> Vec<f64> {
        let mut row = Vec::with_capacity(MODEL_INPUT_WIDTH);
        row.extend_from_slice(&self.values);
        row.extend(std::iter::repeat(0.0).take(INTERVENTION_COUNT));
        for dimension in enabled {
            row[FEATURE_COUNT + dimension.index()] = 1.0;
        }
        row
    }

    /// Model row with every intervention flag off.
    pub fn baseline_row(&self) -> Vec<f64> {
        self.scenario_row(&[])
    }
}

/// Baseline row plus one assignment of intervention flags.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScenario {
    ordinal: usize,
    row: Vec<f64>,
    enabled: Vec<InterventionDimension>,
}

impl CandidateScenario {
    pub(crate) fn new(
        ordinal: usize,
        baseline: &BaselineVector,
        enabled: Vec<InterventionDimension>,
    ) -> Self {
        let row = baseline.scenario_row(&enabled);
        Self {
            ordinal,
            row,
            enabled,
        }
    }

    /// Position in generation order, used to break score ties.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn row(&self) -> &[f64] {
        &self.row
    }

    pub fn enabled(&self) -> &[InterventionDimension] {
        &self.enabled
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub scenario: CandidateScenario,
    pub score: f64,
}

/// One decoded recommendation: the services to switch on and the predicted outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub predicted_score: f64,
    pub interventions: Vec<String>,
}

/// Outcome of a recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Registry name of the model that scored every row of this request.
    pub model: String,
    pub baseline: f64,
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationResult {
    pub fn summary(&self) -> String {
        match self.recommendations.first() {
            None => "no recommendations available".to_string(),
            Some(best) => {
                let services = if best.interventions.is_empty() {
                    "no services".to_string()
                } else {
                    best.interventions.join(", ")
                };
                format!(
                    "best of {} scenario(s): {} ({:.3} vs baseline {:.3})",
                    self.recommendations.len(),
                    services,
                    best.predicted_score,
                    self.baseline
                )
            }
        }
    }

    /// Improvement of the top-ranked scenario over the baseline, if any scenario exists.
    pub fn best_uplift(&self) -> Option<f64> {
        self.recommendations
            .first()
            .map(|best| best.predicted_score - self.baseline)
    }

    pub fn view(&self) -> RecommendationView {
        RecommendationView {
            model: self.model.clone(),
            baseline: self.baseline,
            recommendations: self.recommendations.clone(),
            summary: self.summary(),
        }
    }
}

/// Serialized response shape for API and CLI consumers.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub model: String,
    pub baseline: f64,
    pub recommendations: Vec<Recommendation>,
    pub summary: String,
}
