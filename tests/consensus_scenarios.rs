//! Consensus scenario tests: end-to-end checks of aggregation and agreement
//! over the public API.
//!
//! Tests verify:
//! - Unanimous, split and single-model ensembles land in the right tier
//! - An empty consensus set forces LOW agreement
//! - The two-thirds boundary counts as HIGH
//! - Merged entries carry the same support counts as the consensus set

use breed_consensus::{
    aggregate, analyze_consensus, AgreementTier, ConsensusEngine, EngineError, EnsembleInput,
    ModelRanking,
};

fn ensemble(models: &[(&str, &[(&str, f64)])]) -> EnsembleInput {
    EnsembleInput::new(models.iter().map(|(id, pairs)| {
        (
            id.to_string(),
            ModelRanking::from_pairs(pairs.iter().copied()).unwrap(),
        )
    }))
    .unwrap()
}

// ── Scenario A: unanimous top pick ─────────────────────────────────

#[test]
fn scenario_unanimous_top_pick_is_high() {
    let input = ensemble(&[
        ("model_a", &[("Labrador", 0.9), ("Golden Retriever", 0.05)]),
        ("model_b", &[("Labrador", 0.8), ("Beagle", 0.1)]),
        ("model_c", &[("Labrador", 0.7), ("Boxer", 0.2)]),
    ]);

    let merged = aggregate(&input).unwrap();
    assert_eq!(merged.top().unwrap().breed, "Labrador");
    assert!((merged.top().unwrap().confidence - 0.8).abs() < 1e-9);

    let outcome = analyze_consensus(&input, &merged).unwrap();
    assert_eq!(outcome.agreement.tier, AgreementTier::High);
    assert!((outcome.agreement.agreement_percentage - 100.0).abs() < 1e-9);
    assert_eq!(outcome.consensus[0].breed, "Labrador");
    assert_eq!(outcome.consensus[0].support_count, 3);
}

// ── Scenario B: confident but disjoint models ──────────────────────

#[test]
fn scenario_disjoint_models_force_low() {
    let input = ensemble(&[
        ("model_a", &[("Labrador", 0.95), ("Akita", 0.02), ("Pug", 0.01)]),
        ("model_b", &[("Poodle", 0.93), ("Maltese", 0.03), ("Boxer", 0.01)]),
        ("model_c", &[("Beagle", 0.91), ("Collie", 0.04), ("Samoyed", 0.02)]),
    ]);

    let merged = aggregate(&input).unwrap();
    let outcome = analyze_consensus(&input, &merged).unwrap();

    assert!(outcome.consensus.is_empty());
    assert_eq!(outcome.agreement.tier, AgreementTier::Low);
    assert_eq!(outcome.agreement.agreement_percentage, 0.0);
}

#[test]
fn empty_consensus_overrides_shared_top_pick() {
    // model_a's top-1 matches the merged top, which alone would be 50% (moderate),
    // but no breed sits in two models' top-3
    let input = ensemble(&[
        ("model_a", &[("Labrador", 0.9)]),
        ("model_b", &[("Poodle", 0.4)]),
    ]);

    let merged = aggregate(&input).unwrap();
    assert_eq!(merged.top().unwrap().breed, "Labrador");

    let outcome = analyze_consensus(&input, &merged).unwrap();
    assert!(outcome.consensus.is_empty());
    assert_eq!(outcome.agreement.tier, AgreementTier::Low);
    assert_eq!(outcome.agreement.agreement_percentage, 0.0);
}

// ── Scenario C: two of three agree ─────────────────────────────────

#[test]
fn scenario_two_of_three_is_high_at_boundary() {
    let input = ensemble(&[
        ("model_a", &[("Poodle", 0.6), ("Beagle", 0.1)]),
        ("model_b", &[("Poodle", 0.55), ("Beagle", 0.1)]),
        ("model_c", &[("Beagle", 0.9)]),
    ]);

    let merged = aggregate(&input).unwrap();
    // Poodle 0.575 beats Beagle (0.1 + 0.1 + 0.9) / 3
    assert_eq!(merged.top().unwrap().breed, "Poodle");

    let outcome = analyze_consensus(&input, &merged).unwrap();
    assert!((outcome.agreement.agreement_percentage - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(outcome.agreement.tier, AgreementTier::High);
}

// ── Scenario D: a single model cannot corroborate itself ───────────

#[test]
fn scenario_single_model_is_low() {
    let input = ensemble(&[("model_a", &[("Samoyed", 0.99), ("Maltese", 0.005)])]);

    let merged = aggregate(&input).unwrap();
    let outcome = analyze_consensus(&input, &merged).unwrap();

    assert!(outcome.consensus.is_empty());
    assert_eq!(outcome.agreement.tier, AgreementTier::Low);
    assert_eq!(outcome.agreement.agreement_percentage, 0.0);
}

// ── Error paths ────────────────────────────────────────────────────

#[test]
fn empty_ensemble_is_a_validation_error() {
    let result = EnsembleInput::new(Vec::new());
    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[test]
fn model_with_no_predictions_is_a_validation_error() {
    assert!(matches!(
        ModelRanking::new(Vec::new()),
        Err(EngineError::Validation(_))
    ));
}

// ── Engine output consistency ──────────────────────────────────────

#[test]
fn engine_report_support_matches_consensus() {
    let input = ensemble(&[
        ("model_a", &[("Husky", 0.5), ("Malamute", 0.3), ("Samoyed", 0.1)]),
        ("model_b", &[("Malamute", 0.45), ("Husky", 0.4), ("Akita", 0.05)]),
        ("model_c", &[("Husky", 0.7), ("Samoyed", 0.2), ("Akita", 0.05)]),
        ("model_d", &[("Akita", 0.4), ("Shiba Inu", 0.3), ("Husky", 0.2)]),
    ]);

    let report = ConsensusEngine::default().evaluate(&input, None).unwrap();

    assert_eq!(report.merged.top().unwrap().breed, "Husky");
    assert_eq!(report.consensus[0].breed, "Husky");
    assert_eq!(report.consensus[0].support_count, 4);

    for entry in report.merged.entries() {
        let support = entry.supporting_model_count.unwrap();
        match report.consensus.iter().find(|c| c.breed == entry.breed) {
            Some(consensus) => assert_eq!(consensus.support_count, support),
            None => assert!(support <= 1, "{} has support {}", entry.breed, support),
        }
    }

    // model_a and model_c pick Husky: 50%
    assert_eq!(report.agreement.tier, AgreementTier::Moderate);
    assert!((report.agreement.agreement_percentage - 50.0).abs() < 1e-9);
}
