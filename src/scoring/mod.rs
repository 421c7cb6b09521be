//! Per-request scoring.
//!
//! `score` is the whole inference path for one applicant:
//! derive ratios -> assemble the artifact's feature row -> classifier ->
//! label / tier / action. It is a pure function of its inputs; the artifact is
//! borrowed, never mutated, and nothing is logged here.

use crate::domain::{ApplicantInput, RiskTier, ScoringResult};
use crate::features::{build_feature_vector, derive_ratios};
use crate::io::Artifact;
use crate::models::InferenceError;

/// Score one applicant against a loaded artifact.
///
/// Classifier failures are returned unchanged. Input values are not checked:
/// range validation belongs to the caller.
pub fn score(input: &ApplicantInput, artifact: &Artifact) -> Result<ScoringResult, InferenceError> {
    let ratios = derive_ratios(input);
    let features = build_feature_vector(artifact.feature_names(), input, &ratios);

    let probabilities = artifact.classifier().predict_proba(&features)?;
    let probability = probabilities.positive;
    if !(probability.is_finite() && (0.0..=1.0).contains(&probability)) {
        return Err(InferenceError::InvalidProbability(probability));
    }

    let threshold = artifact.threshold();
    let tier = RiskTier::classify(probability, threshold);

    Ok(ScoringResult {
        probability,
        predicted_label: probability >= threshold,
        tier,
        suggested_action: tier.suggested_action().to_string(),
        threshold,
        ratios,
        features,
    })
}
