//! Domain types used throughout the scorer.
//!
//! This module defines:
//!
//! - applicant inputs (`ApplicantInput`, `ContractType`)
//! - the feature row sent to the classifier (`FeatureVector`, `FeatureValue`)
//! - scoring outputs (`ScoringResult`, `RiskTier`, `Advisory`)

pub mod types;

pub use types::*;
