//! End-to-end: load the bundled demo artifact and score applicants through it.

use std::path::PathBuf;

use desist::domain::{ApplicantInput, ContractType, FeatureValue, RiskTier};
use desist::io::load_artifact;
use desist::scoring::score;

fn demo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("desistance_model.json")
}

#[test]
fn demo_artifact_loads() {
    let artifact = load_artifact(&demo_path()).unwrap();
    assert_eq!(artifact.threshold(), 0.30);
    assert_eq!(artifact.feature_names().len(), 9);
    assert_eq!(artifact.classifier().kind(), "gradient_boosting");
    assert_eq!(artifact.display_name(), "desistance-gbdt-demo");
}

#[test]
fn default_applicant_is_high_risk() {
    let artifact = load_artifact(&demo_path()).unwrap();
    let result = score(&ApplicantInput::default(), &artifact).unwrap();

    // sigmoid(-0.9 + 0.2 + 0.35 - 0.1)
    assert!((result.probability - 0.389_360_766).abs() < 1e-6);
    assert!(result.predicted_label);
    assert_eq!(result.tier, RiskTier::High);
    assert!((result.ratios.financial_stress - 2.0).abs() < 1e-6);
    assert_eq!(
        result.features.get("TIPO_CONTRATO"),
        Some(&FeatureValue::Category("Otra".to_string()))
    );
}

#[test]
fn indefinite_contract_lowers_the_tier() {
    let artifact = load_artifact(&demo_path()).unwrap();
    let input = ApplicantInput {
        contract_type: ContractType::Indefinite,
        ..ApplicantInput::default()
    };
    let result = score(&input, &artifact).unwrap();
    assert!((result.probability - 0.249_739_894).abs() < 1e-6);
    assert!(!result.predicted_label);
    assert_eq!(result.tier, RiskTier::Medium);

    let input = ApplicantInput {
        requested_amount: 1_000_000.0,
        dependents: 0,
        contract_type: ContractType::Indefinite,
        ..ApplicantInput::default()
    };
    let result = score(&input, &artifact).unwrap();
    assert_eq!(result.tier, RiskTier::Low);
    assert_eq!(result.suggested_action, "normal flow, no immediate intervention");
}

#[test]
fn zero_income_scores_without_error() {
    let artifact = load_artifact(&demo_path()).unwrap();
    let input = ApplicantInput {
        income: 0.0,
        expenses: 500_000.0,
        ..ApplicantInput::default()
    };
    let result = score(&input, &artifact).unwrap();
    assert!((result.ratios.debt_ratio - 5e11).abs() / 5e11 < 1e-12);
    assert_eq!(result.ratios.payment_capacity, -500_000.0);
    assert_eq!(result.tier, RiskTier::High);
}
