//! Shared "assessment" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! advisories -> score
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use serde::Serialize;
use tracing::debug;

use crate::domain::{Advisory, ApplicantInput, ScoringResult, advisories};
use crate::io::Artifact;
use crate::models::InferenceError;

/// Everything the front-ends render for one applicant.
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub input: ApplicantInput,
    pub advisories: Vec<Advisory>,
    pub result: ScoringResult,
}

/// Collect advisories and score the applicant.
///
/// Advisories never block scoring.
pub fn assess(input: ApplicantInput, artifact: &Artifact) -> Result<Assessment, InferenceError> {
    let advisories = advisories(&input);
    let result = crate::scoring::score(&input, artifact)?;
    debug!(
        probability = result.probability,
        tier = result.tier.display_name(),
        "scored applicant"
    );
    Ok(Assessment {
        input,
        advisories,
        result,
    })
}
