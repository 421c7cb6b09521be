//! Standardized logistic regression.
//!
//! One input entry per feature column, in column order:
//!
//! - numeric: `x = (v - mean) / scale`, weighted by `coef`
//! - categorical: one-hot, the matching level contributes its weight
//!
//! Missing values contribute nothing (mean imputation for numeric columns,
//! all-zero one-hot for categorical ones). A category the model never saw is
//! an inference error.

use std::collections::BTreeMap;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::{FeatureValue, FeatureVector};
use crate::models::{
    ClassProbabilities, Classifier, InferenceError, column_name, sigmoid, value_kind,
};

fn unit_scale() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogisticInput {
    Numeric {
        coef: f64,
        #[serde(default)]
        mean: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
    },
    Categorical { levels: BTreeMap<String, f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    #[serde(default)]
    pub intercept: f64,
    pub inputs: Vec<LogisticInput>,
}

impl LogisticModel {
    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), String> {
        if !self.intercept.is_finite() {
            return Err("logistic intercept must be finite".to_string());
        }
        for (idx, input) in self.inputs.iter().enumerate() {
            match input {
                LogisticInput::Numeric { coef, mean, scale } => {
                    if !(coef.is_finite() && mean.is_finite()) {
                        return Err(format!("input {idx}: coef/mean must be finite"));
                    }
                    if !(scale.is_finite() && *scale > 0.0) {
                        return Err(format!("input {idx}: scale must be finite and > 0"));
                    }
                }
                LogisticInput::Categorical { levels } => {
                    if let Some((label, _)) = levels.iter().find(|(_, w)| !w.is_finite()) {
                        return Err(format!("input {idx}: weight for level '{label}' must be finite"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Linear predictor `intercept + wᵀx` for one row.
    pub fn margin(&self, row: &FeatureVector) -> Result<f64, InferenceError> {
        let n = self.inputs.len();
        if row.len() != n {
            return Err(InferenceError::ShapeMismatch {
                expected: n,
                actual: row.len(),
            });
        }

        let mut w = DVector::<f64>::zeros(n);
        let mut x = DVector::<f64>::zeros(n);

        for (idx, (input, value)) in self.inputs.iter().zip(row.values()).enumerate() {
            match (input, value) {
                (_, FeatureValue::Missing) => {}
                (LogisticInput::Numeric { coef, mean, scale }, FeatureValue::Number(v)) => {
                    if v.is_nan() {
                        continue;
                    }
                    w[idx] = *coef;
                    x[idx] = (v - mean) / scale;
                }
                (LogisticInput::Categorical { levels }, FeatureValue::Category(label)) => {
                    let weight = levels.get(label).ok_or_else(|| InferenceError::UnknownCategory {
                        column: column_name(row, idx),
                        label: label.clone(),
                    })?;
                    w[idx] = *weight;
                    x[idx] = 1.0;
                }
                (LogisticInput::Numeric { .. }, other) => {
                    return Err(InferenceError::TypeMismatch {
                        column: column_name(row, idx),
                        expected: "numeric",
                        found: value_kind(other),
                    });
                }
                (LogisticInput::Categorical { .. }, other) => {
                    return Err(InferenceError::TypeMismatch {
                        column: column_name(row, idx),
                        expected: "categorical",
                        found: value_kind(other),
                    });
                }
            }
        }

        Ok(self.intercept + w.dot(&x))
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, row: &FeatureVector) -> Result<ClassProbabilities, InferenceError> {
        let z = self.margin(row)?;
        Ok(ClassProbabilities::from_positive(sigmoid(z)))
    }

    fn kind(&self) -> &'static str {
        "logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LogisticModel {
        let levels = BTreeMap::from([
            ("Indefinido".to_string(), -0.5),
            ("Otra".to_string(), 0.25),
        ]);
        LogisticModel {
            intercept: -1.0,
            inputs: vec![
                LogisticInput::Numeric {
                    coef: 2.0,
                    mean: 1.0,
                    scale: 0.5,
                },
                LogisticInput::Categorical { levels },
            ],
        }
    }

    fn row(a: FeatureValue, b: FeatureValue) -> FeatureVector {
        let mut row = FeatureVector::with_capacity(2);
        row.push("RATIO", a);
        row.push("TIPO_CONTRATO", b);
        row
    }

    #[test]
    fn margin_combines_standardized_and_one_hot_terms() {
        let m = model();
        let z = m
            .margin(&row(FeatureValue::Number(1.5), FeatureValue::Category("Otra".into())))
            .unwrap();
        // -1 + 2 * (1.5 - 1) / 0.5 + 0.25
        assert!((z - 1.25).abs() < 1e-12);

        let p = m
            .predict_proba(&row(FeatureValue::Number(1.5), FeatureValue::Category("Otra".into())))
            .unwrap();
        assert!((p.positive - sigmoid(1.25)).abs() < 1e-12);
        assert!((p.positive + p.negative - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_values_contribute_nothing() {
        let m = model();
        let z = m.margin(&row(FeatureValue::Missing, FeatureValue::Missing)).unwrap();
        assert_eq!(z, -1.0);
        let z = m
            .margin(&row(FeatureValue::Number(f64::NAN), FeatureValue::Missing))
            .unwrap();
        assert_eq!(z, -1.0);
    }

    #[test]
    fn unseen_category_is_an_error() {
        let err = model()
            .margin(&row(FeatureValue::Number(1.0), FeatureValue::Category("Temporal".into())))
            .unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnknownCategory {
                column: "TIPO_CONTRATO".to_string(),
                label: "Temporal".to_string(),
            }
        );
    }

    #[test]
    fn shape_and_type_mismatches_are_errors() {
        let m = model();
        let mut short = FeatureVector::default();
        short.push("RATIO", FeatureValue::Number(1.0));
        assert!(matches!(
            m.margin(&short),
            Err(InferenceError::ShapeMismatch { expected: 2, actual: 1 })
        ));

        let err = m
            .margin(&row(FeatureValue::Category("x".into()), FeatureValue::Missing))
            .unwrap_err();
        assert!(matches!(err, InferenceError::TypeMismatch { expected: "numeric", .. }));
    }

    #[test]
    fn validate_rejects_bad_scale() {
        let mut m = model();
        m.inputs[0] = LogisticInput::Numeric {
            coef: 1.0,
            mean: 0.0,
            scale: 0.0,
        };
        assert!(m.validate().is_err());
        assert!(model().validate().is_ok());
    }
}
