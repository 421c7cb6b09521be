//! Classifier implementations.
//!
//! The scorer only depends on the [`Classifier`] trait: given a single feature
//! row, return per-class probabilities. Artifacts carry one of the concrete
//! families below; tests inject deterministic stubs.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::FeatureVector;

pub mod boosting;
pub mod logistic;

pub use boosting::*;
pub use logistic::*;

/// Per-class probabilities for a binary classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassProbabilities {
    pub negative: f64,
    /// Desistance class.
    pub positive: f64,
}

impl ClassProbabilities {
    pub fn from_positive(positive: f64) -> Self {
        Self {
            negative: 1.0 - positive,
            positive,
        }
    }
}

/// Failure while running the classifier on one row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("feature row has {actual} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("unexpected category '{label}' in column '{column}'")]
    UnknownCategory { column: String, label: String },
    #[error("column '{column}' holds a {found} value where the model expects a {expected} one")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("classifier returned an invalid probability ({0})")]
    InvalidProbability(f64),
    #[error("malformed model: {0}")]
    MalformedModel(String),
}

/// Pure probability estimator.
///
/// Implementations must not mutate state on prediction: the same row always
/// yields the same probabilities.
pub trait Classifier: fmt::Debug + Send + Sync {
    fn predict_proba(&self, row: &FeatureVector) -> Result<ClassProbabilities, InferenceError>;

    /// Short family name for summaries.
    fn kind(&self) -> &'static str;
}

/// Serialized classifier, as stored under the artifact's `model` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Logistic(LogisticModel),
    GradientBoosting(BoostedTrees),
}

impl ModelSpec {
    /// Number of feature columns the model reads.
    pub fn width(&self) -> usize {
        match self {
            ModelSpec::Logistic(m) => m.inputs.len(),
            ModelSpec::GradientBoosting(m) => m.num_features,
        }
    }

    /// Validate the parameters and hand back a ready classifier.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, String> {
        match self {
            ModelSpec::Logistic(m) => {
                m.validate()?;
                Ok(Box::new(m))
            }
            ModelSpec::GradientBoosting(m) => {
                m.validate()?;
                Ok(Box::new(m))
            }
        }
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

pub(crate) fn value_kind(value: &crate::domain::FeatureValue) -> &'static str {
    match value {
        crate::domain::FeatureValue::Number(_) => "numeric",
        crate::domain::FeatureValue::Category(_) => "categorical",
        crate::domain::FeatureValue::Missing => "missing",
    }
}

pub(crate) fn column_name(row: &FeatureVector, idx: usize) -> String {
    row.name_at(idx).unwrap_or("?").to_string()
}
