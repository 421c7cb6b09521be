//! Gradient-boosted decision trees (binary log-loss).
//!
//! Each tree is stored as a flat node array rooted at index 0. Prediction sums
//! the leaf values reached in every tree on top of `base_score` and maps the raw
//! margin through the logistic function.
//!
//! Missing-value routing follows the usual GBDT conventions:
//! - numeric splits send missing values to the side chosen at training time
//!   (`default_left`)
//! - categorical splits send missing and unseen labels to the right child

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureValue, FeatureVector};
use crate::models::{
    ClassProbabilities, Classifier, InferenceError, column_name, sigmoid, value_kind,
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Leaf(f64),
    Numeric {
        feature: usize,
        threshold: f64,
        #[serde(default = "default_true")]
        default_left: bool,
        left: usize,
        right: usize,
    },
    Categorical {
        feature: usize,
        categories: Vec<String>,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostedTrees {
    #[serde(default)]
    pub base_score: f64,
    pub num_features: usize,
    pub trees: Vec<Tree>,
}

impl BoostedTrees {
    /// Structural checks so prediction can walk trees without bounds failures.
    ///
    /// Children must point strictly forward, which rules out cycles.
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_score.is_finite() {
            return Err("base_score must be finite".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("tree {t} has no nodes"));
            }
            let n = tree.nodes.len();
            for (i, node) in tree.nodes.iter().enumerate() {
                let (feature, left, right) = match node {
                    Node::Leaf(v) => {
                        if !v.is_finite() {
                            return Err(format!("tree {t} node {i}: leaf value must be finite"));
                        }
                        continue;
                    }
                    Node::Numeric {
                        feature,
                        threshold,
                        left,
                        right,
                        ..
                    } => {
                        if threshold.is_nan() {
                            return Err(format!("tree {t} node {i}: threshold is NaN"));
                        }
                        (*feature, *left, *right)
                    }
                    Node::Categorical {
                        feature, left, right, ..
                    } => (*feature, *left, *right),
                };
                if feature >= self.num_features {
                    return Err(format!(
                        "tree {t} node {i}: feature {feature} out of range (num_features={})",
                        self.num_features
                    ));
                }
                for child in [left, right] {
                    if child <= i || child >= n {
                        return Err(format!("tree {t} node {i}: invalid child index {child}"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Raw additive margin for one row.
    pub fn margin(&self, row: &FeatureVector) -> Result<f64, InferenceError> {
        if row.len() != self.num_features {
            return Err(InferenceError::ShapeMismatch {
                expected: self.num_features,
                actual: row.len(),
            });
        }

        let mut total = self.base_score;
        for (t, tree) in self.trees.iter().enumerate() {
            total += leaf_value(t, tree, row)?;
        }
        Ok(total)
    }
}

/// Walk one tree to its leaf.
///
/// Trees built by hand skip `validate`, so the walk re-checks that each child
/// exists and points forward; otherwise a bad tree could panic or never end.
fn leaf_value(t: usize, tree: &Tree, row: &FeatureVector) -> Result<f64, InferenceError> {
    let mut idx = 0;
    loop {
        let Some(node) = tree.nodes.get(idx) else {
            return Err(InferenceError::MalformedModel(format!(
                "tree {t}: node {idx} does not exist ({} nodes)",
                tree.nodes.len()
            )));
        };
        let next = match node {
            Node::Leaf(v) => return Ok(*v),
            Node::Numeric {
                feature,
                threshold,
                default_left,
                left,
                right,
            } => match row.value_at(*feature) {
                Some(FeatureValue::Number(v)) if !v.is_nan() => {
                    if *v <= *threshold { *left } else { *right }
                }
                Some(FeatureValue::Number(_)) | Some(FeatureValue::Missing) | None => {
                    if *default_left { *left } else { *right }
                }
                Some(other) => {
                    return Err(InferenceError::TypeMismatch {
                        column: column_name(row, *feature),
                        expected: "numeric",
                        found: value_kind(other),
                    });
                }
            },
            Node::Categorical {
                feature,
                categories,
                left,
                right,
            } => match row.value_at(*feature) {
                Some(FeatureValue::Category(label)) => {
                    if categories.iter().any(|c| c == label) { *left } else { *right }
                }
                Some(FeatureValue::Missing) | None => *right,
                Some(other) => {
                    return Err(InferenceError::TypeMismatch {
                        column: column_name(row, *feature),
                        expected: "categorical",
                        found: value_kind(other),
                    });
                }
            },
        };
        if next <= idx {
            return Err(InferenceError::MalformedModel(format!(
                "tree {t}: node {idx} points back to node {next}"
            )));
        }
        idx = next;
    }
}

impl Classifier for BoostedTrees {
    fn predict_proba(&self, row: &FeatureVector) -> Result<ClassProbabilities, InferenceError> {
        let z = self.margin(row)?;
        Ok(ClassProbabilities::from_positive(sigmoid(z)))
    }

    fn kind(&self) -> &'static str {
        "gradient_boosting"
    }
}
