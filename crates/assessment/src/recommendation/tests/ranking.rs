use super::common::*;
use crate::recommendation::domain::{InterventionDimension, FEATURE_COUNT, MODEL_INPUT_WIDTH};
use crate::recommendation::ranking::{decode_interventions, Ranker};

use InterventionDimension::*;

#[test]
fn highest_scores_come_first() {
    let ranked = Ranker::new(3).rank(vec![
        scored(0, 0.31, &[EmploymentAssistance]),
        scored(1, 0.74, &[LifeStabilization]),
        scored(2, 0.52, &[RetentionServices]),
        scored(3, 0.12, &[EnhancedReferrals]),
    ]);

    let scores: Vec<f64> = ranked.iter().map(|r| r.predicted_score).collect();
    assert_eq!(scores, vec![0.74, 0.52, 0.31]);
    assert_eq!(ranked[0].interventions, vec!["life_stabilization"]);
}

#[test]
fn equal_scores_keep_generation_order() {
    let ranked = Ranker::new(3).rank(vec![
        scored(2, 0.6, &[RetentionServices]),
        scored(0, 0.6, &[EmploymentAssistance]),
        scored(1, 0.6, &[LifeStabilization]),
    ]);

    let names: Vec<&str> = ranked
        .iter()
        .map(|r| r.interventions[0].as_str())
        .collect();
    assert_eq!(
        names,
        vec!["employment_assistance", "life_stabilization", "retention_services"]
    );
}

#[test]
fn returns_everything_when_fewer_than_k() {
    let ranked = Ranker::new(5).rank(vec![
        scored(0, 0.2, &[EmploymentAssistance]),
        scored(1, 0.4, &[SpecializedServices, EnhancedReferrals]),
    ]);

    assert_eq!(ranked.len(), 2);
    assert_eq!(
        ranked[0].interventions,
        vec!["specialized_services", "enhanced_referrals"]
    );
}

#[test]
fn zero_k_and_empty_input_yield_nothing() {
    assert!(Ranker::new(0)
        .rank(vec![scored(0, 0.9, &[EmploymentAssistance])])
        .is_empty());
    assert!(Ranker::default().rank(Vec::new()).is_empty());
    assert_eq!(Ranker::default().k(), 3);
}

#[test]
fn decoded_names_follow_column_order() {
    let ranked = Ranker::new(1).rank(vec![scored(
        0,
        0.5,
        &[EnhancedReferrals, EmploymentAssistance, EmployerFinancialSupports],
    )]);

    assert_eq!(
        ranked[0].interventions,
        vec![
            "employment_assistance",
            "employer_financial_supports",
            "enhanced_referrals"
        ]
    );
}

#[test]
fn decoding_requires_values_strictly_above_threshold() {
    let mut row = vec![0.0; MODEL_INPUT_WIDTH];
    row[FEATURE_COUNT] = 0.5;
    row[FEATURE_COUNT + 1] = 0.51;
    row[FEATURE_COUNT + 6] = 1.0;

    assert_eq!(
        decode_interventions(&row),
        vec![LifeStabilization, EnhancedReferrals]
    );
}

#[test]
fn decoding_ignores_client_features_and_short_rows() {
    let mut row = vec![1.0; FEATURE_COUNT];
    assert!(decode_interventions(&row).is_empty());

    row.extend([0.0; 7]);
    assert!(decode_interventions(&row).is_empty());
}
