//! Model artifact loading.
//!
//! The artifact is a single JSON document holding:
//! - `model`: the serialized classifier (`models::ModelSpec`)
//! - `best_threshold` (alias `threshold`): operating cutoff in [0, 1]
//! - `feature_cols`: ordered column names the classifier expects
//! - optional `name` / `trained_on` metadata for display
//!
//! Loading happens once at startup; the returned [`Artifact`] is immutable and
//! is passed by reference to every scoring call.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::models::{Classifier, ModelSpec};

pub const DEFAULT_ARTIFACT_PATH: &str = "desistance_model.json";

/// Keys every artifact must carry; the first spelling is the canonical one.
const REQUIRED_KEYS: [&[&str]; 3] = [&["model"], &["best_threshold", "threshold"], &["feature_cols"]];

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("threshold must be a number in [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("duplicate feature column '{0}'")]
    DuplicateFeature(String),
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Optional descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct ArtifactMeta {
    pub name: Option<String>,
    pub trained_on: Option<NaiveDate>,
    pub source: Option<PathBuf>,
}

/// Loaded classifier plus its operating threshold and column contract.
#[derive(Debug)]
pub struct Artifact {
    classifier: Box<dyn Classifier>,
    threshold: f64,
    feature_names: Vec<String>,
    meta: ArtifactMeta,
}

impl Artifact {
    /// Assemble an artifact from already-built parts.
    pub fn new(
        classifier: Box<dyn Classifier>,
        threshold: f64,
        feature_names: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        if !(threshold.is_finite() && (0.0..=1.0).contains(&threshold)) {
            return Err(ArtifactError::InvalidThreshold(threshold));
        }
        let mut seen = HashSet::with_capacity(feature_names.len());
        for name in &feature_names {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::DuplicateFeature(name.clone()));
            }
        }
        Ok(Self {
            classifier,
            threshold,
            feature_names,
            meta: ArtifactMeta::default(),
        })
    }

    pub fn with_meta(mut self, meta: ArtifactMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn meta(&self) -> &ArtifactMeta {
        &self.meta
    }

    /// Name for headers; falls back to the file name.
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.meta.name {
            return name.clone();
        }
        self.meta
            .source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    trained_on: Option<NaiveDate>,
    #[serde(alias = "threshold")]
    best_threshold: f64,
    feature_cols: Vec<String>,
    model: ModelSpec,
}

/// Read and validate an artifact file.
pub fn load_artifact(path: &Path) -> Result<Artifact, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;

    let mut artifact = parse_artifact(value)?;
    artifact.meta.source = Some(path.to_path_buf());

    info!(
        path = %path.display(),
        kind = artifact.classifier.kind(),
        threshold = artifact.threshold,
        features = artifact.feature_names.len(),
        "loaded model artifact"
    );
    Ok(artifact)
}

/// Build an artifact from an already-parsed JSON document.
pub fn parse_artifact(value: serde_json::Value) -> Result<Artifact, ArtifactError> {
    for keys in REQUIRED_KEYS {
        if !keys.iter().any(|k| value.get(k).is_some()) {
            return Err(ArtifactError::MissingField(keys[0]));
        }
    }

    let file: ArtifactFile = serde_json::from_value(value)?;
    if file.model.width() != file.feature_cols.len() {
        return Err(ArtifactError::InvalidModel(format!(
            "model reads {} columns but feature_cols lists {}",
            file.model.width(),
            file.feature_cols.len()
        )));
    }
    let classifier = file.model.into_classifier().map_err(ArtifactError::InvalidModel)?;

    let artifact = Artifact::new(classifier, file.best_threshold, file.feature_cols)?;
    Ok(artifact.with_meta(ArtifactMeta {
        name: file.name,
        trained_on: file.trained_on,
        source: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "name": "desistance-logit",
            "trained_on": "2025-06-30",
            "best_threshold": 0.3,
            "feature_cols": ["INGRESOS", "TIPO_CONTRATO"],
            "model": {
                "kind": "logistic",
                "intercept": -0.4,
                "inputs": [
                    {"numeric": {"coef": -0.1, "mean": 2000000.0, "scale": 1000000.0}},
                    {"categorical": {"levels": {"Otra": 0.2, "Indefinido": -0.3}}}
                ]
            }
        })
    }

    #[test]
    fn parses_complete_artifact() {
        let artifact = parse_artifact(sample()).unwrap();
        assert_eq!(artifact.threshold(), 0.3);
        assert_eq!(artifact.feature_names(), ["INGRESOS", "TIPO_CONTRATO"]);
        assert_eq!(artifact.classifier().kind(), "logistic");
        assert_eq!(artifact.display_name(), "desistance-logit");
        assert_eq!(artifact.meta().trained_on, NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn accepts_threshold_alias() {
        let mut value = sample();
        let obj = value.as_object_mut().unwrap();
        obj.remove("best_threshold");
        obj.insert("threshold".to_string(), json!(0.45));
        assert_eq!(parse_artifact(value).unwrap().threshold(), 0.45);
    }

    #[test]
    fn each_required_field_is_enforced() {
        for (field, key) in [
            ("model", "model"),
            ("best_threshold", "best_threshold"),
            ("feature_cols", "feature_cols"),
        ] {
            let mut value = sample();
            value.as_object_mut().unwrap().remove(key);
            match parse_artifact(value) {
                Err(ArtifactError::MissingField(f)) => assert_eq!(f, field),
                other => panic!("expected missing {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_out_of_range_threshold_and_duplicates() {
        let mut value = sample();
        value["best_threshold"] = json!(1.5);
        assert!(matches!(parse_artifact(value), Err(ArtifactError::InvalidThreshold(_))));

        let mut value = sample();
        value["feature_cols"] = json!(["INGRESOS", "INGRESOS"]);
        assert!(matches!(parse_artifact(value), Err(ArtifactError::DuplicateFeature(_))));
    }

    #[test]
    fn rejects_invalid_model_parameters() {
        let mut value = sample();
        value["model"]["inputs"][0]["numeric"]["scale"] = json!(-1.0);
        assert!(matches!(parse_artifact(value), Err(ArtifactError::InvalidModel(_))));
    }

    #[test]
    fn model_width_must_match_feature_cols() {
        let mut value = sample();
        value["feature_cols"] = json!(["INGRESOS", "TIPO_CONTRATO", "EGRESOS"]);
        match parse_artifact(value) {
            Err(ArtifactError::InvalidModel(msg)) => assert!(msg.contains("reads 2 columns")),
            other => panic!("expected width mismatch, got {other:?}"),
        }

        let trees = json!({
            "best_threshold": 0.5,
            "feature_cols": ["INGRESOS"],
            "model": {
                "kind": "gradient_boosting",
                "num_features": 2,
                "trees": [{"nodes": [{"leaf": 0.1}]}]
            }
        });
        assert!(matches!(parse_artifact(trees), Err(ArtifactError::InvalidModel(_))));
    }

    #[test]
    fn load_reports_missing_and_corrupt_files() {
        let dir = std::env::temp_dir().join(format!("desist-artifact-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("nope.json");
        assert!(matches!(load_artifact(&missing), Err(ArtifactError::Open { .. })));

        let corrupt = dir.join("corrupt.json");
        std::fs::write(&corrupt, b"{ not json").unwrap();
        assert!(matches!(load_artifact(&corrupt), Err(ArtifactError::Parse(_))));

        let good = dir.join("good.json");
        std::fs::write(&good, serde_json::to_vec(&sample()).unwrap()).unwrap();
        let artifact = load_artifact(&good).unwrap();
        assert_eq!(artifact.meta().source.as_deref(), Some(good.as_path()));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
