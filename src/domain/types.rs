//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - built per request by the scorer
//! - rendered by the CLI and the TUI
//! - emitted as JSON (`desist score --format json`)

use clap::ValueEnum;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Employment contract of the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ContractType {
    Indefinite,
    FixedTerm,
    Temporary,
    Other,
}

impl ContractType {
    pub const ALL: [ContractType; 4] = [
        ContractType::Indefinite,
        ContractType::FixedTerm,
        ContractType::Temporary,
        ContractType::Other,
    ];

    /// Category label the classifier saw during training.
    pub fn training_label(self) -> &'static str {
        match self {
            ContractType::Indefinite => "Indefinido",
            ContractType::FixedTerm => "Término fijo",
            ContractType::Temporary => "Temporal",
            ContractType::Other => "Otra",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ContractType::Indefinite => "Indefinite",
            ContractType::FixedTerm => "Fixed term",
            ContractType::Temporary => "Temporary",
            ContractType::Other => "Other",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Raw applicant attributes, as captured by the form.
///
/// Values are not validated here: the scorer accepts whatever the caller
/// supplies and leaves range checks to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApplicantInput {
    pub income: f64,
    pub expenses: f64,
    pub requested_amount: f64,
    pub dependents: u32,
    pub contract_type: ContractType,
}

impl Default for ApplicantInput {
    fn default() -> Self {
        Self {
            income: 2_000_000.0,
            expenses: 1_000_000.0,
            requested_amount: 3_000_000.0,
            dependents: 1,
            contract_type: ContractType::Other,
        }
    }
}

/// Ratio features computed from the raw inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedRatios {
    /// `income - expenses`; negative when expenses exceed income.
    pub payment_capacity: f64,
    pub debt_ratio: f64,
    pub request_income_ratio: f64,
    /// `debt_ratio + request_income_ratio`.
    pub financial_stress: f64,
}

/// A single cell of the feature row handed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
    /// Null sentinel: the classifier treats it as a missing value.
    Missing,
}

impl FeatureValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FeatureValue::Missing)
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Number(v) => write!(f, "{v}"),
            FeatureValue::Category(label) => write!(f, "{label}"),
            FeatureValue::Missing => write!(f, "NaN"),
        }
    }
}

/// Ordered single-row feature record.
///
/// The column order and the column set are exactly those of the artifact's
/// `feature_cols`; unresolved columns hold [`FeatureValue::Missing`].
///
/// Serializes as a name -> value map whose keys follow column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    columns: Vec<(String, FeatureValue)>,
}

impl FeatureVector {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            columns: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.columns.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &FeatureValue> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Value at column position `idx`.
    pub fn value_at(&self, idx: usize) -> Option<&FeatureValue> {
        self.columns.get(idx).map(|(_, value)| value)
    }

    pub fn name_at(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, value)| value)
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = FeatureVector;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of feature name to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FeatureVector, A::Error> {
                let mut row = FeatureVector::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, value)) = access.next_entry::<String, FeatureValue>()? {
                    row.push(name, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// Coarse risk bucket relative to the operating threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Bucket `probability` using cut points at 0.75 and 1.25 times `threshold`.
    ///
    /// Both cut points are closed lower bounds of the bucket above them.
    pub fn classify(probability: f64, threshold: f64) -> Self {
        let (low_cut, high_cut) = tier_cuts(threshold);
        if probability < low_cut {
            RiskTier::Low
        } else if probability < high_cut {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn suggested_action(self) -> &'static str {
        match self {
            RiskTier::Low => "normal flow, no immediate intervention",
            RiskTier::Medium => "recommended follow-up within 24h / review offer",
            RiskTier::High => "priority intervention / assisted offer",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

pub const LOW_CUT_FACTOR: f64 = 0.75;
pub const HIGH_CUT_FACTOR: f64 = 1.25;

/// `(low_cut, high_cut)` for a threshold.
pub fn tier_cuts(threshold: f64) -> (f64, f64) {
    (threshold * LOW_CUT_FACTOR, threshold * HIGH_CUT_FACTOR)
}

/// Outcome of one scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Probability mass of the positive (desistance) class.
    pub probability: f64,
    pub predicted_label: bool,
    pub tier: RiskTier,
    pub suggested_action: String,
    pub threshold: f64,
    pub ratios: DerivedRatios,
    /// Exact row sent to the classifier.
    pub features: FeatureVector,
}

/// Non-blocking signal about degenerate inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// Zero income distorts every ratio.
    NonPositiveIncome,
    /// Expenses above a positive income usually raise the risk.
    ExpensesExceedIncome,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::NonPositiveIncome => {
                "Income of 0 distorts the debt and request ratios. Adjust it for a more reliable prediction."
            }
            Advisory::ExpensesExceedIncome => {
                "Expenses exceed income: this usually increases the risk. Check that the figures are correct."
            }
        }
    }

    pub fn is_warning(self) -> bool {
        matches!(self, Advisory::NonPositiveIncome)
    }
}

/// Advisories for an applicant; empty when the inputs look sane.
pub fn advisories(input: &ApplicantInput) -> Vec<Advisory> {
    let mut out = Vec::new();
    if input.income <= 0.0 {
        out.push(Advisory::NonPositiveIncome);
    }
    if input.expenses > input.income && input.income > 0.0 {
        out.push(Advisory::ExpensesExceedIncome);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_closed_below() {
        let t = 0.4;
        let (low_cut, high_cut) = tier_cuts(t);
        assert_eq!(RiskTier::classify(low_cut, t), RiskTier::Medium);
        assert_eq!(RiskTier::classify(high_cut, t), RiskTier::High);
        assert_eq!(RiskTier::classify(low_cut - 1e-9, t), RiskTier::Low);
        assert_eq!(RiskTier::classify(high_cut - 1e-9, t), RiskTier::Medium);
        assert_eq!(RiskTier::classify(0.0, t), RiskTier::Low);
        assert_eq!(RiskTier::classify(1.0, t), RiskTier::High);
    }

    #[test]
    fn tiers_follow_retrained_threshold() {
        assert_eq!(RiskTier::classify(0.2, 0.3), RiskTier::Low);
        assert_eq!(RiskTier::classify(0.2, 0.2), RiskTier::Medium);
        assert_eq!(RiskTier::classify(0.2, 0.1), RiskTier::High);
    }

    #[test]
    fn contract_type_cycles() {
        assert_eq!(ContractType::Other.next(), ContractType::Indefinite);
        assert_eq!(ContractType::Indefinite.prev(), ContractType::Other);
        assert_eq!(ContractType::FixedTerm.training_label(), "Término fijo");
    }

    #[test]
    fn advisories_flag_degenerate_inputs() {
        let mut input = ApplicantInput::default();
        assert!(advisories(&input).is_empty());

        input.income = 0.0;
        input.expenses = 500_000.0;
        // Expenses > income only matters when there is some income.
        assert_eq!(advisories(&input), vec![Advisory::NonPositiveIncome]);

        input.income = 400_000.0;
        assert_eq!(advisories(&input), vec![Advisory::ExpensesExceedIncome]);
    }

    #[test]
    fn feature_vector_keeps_order() {
        let mut row = FeatureVector::with_capacity(2);
        row.push("B", FeatureValue::Number(1.0));
        row.push("A", FeatureValue::Missing);
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["B", "A"]);
        assert!(row.get("A").is_some_and(FeatureValue::is_missing));
        assert_eq!(row.value_at(0), Some(&FeatureValue::Number(1.0)));
    }

    #[test]
    fn feature_vector_serializes_as_ordered_map() {
        let mut row = FeatureVector::with_capacity(3);
        row.push("ZETA", FeatureValue::Number(1.5));
        row.push("ALPHA", FeatureValue::Category("Otra".into()));
        row.push("MID", FeatureValue::Missing);

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"ZETA":1.5,"ALPHA":"Otra","MID":null}"#);

        let back: FeatureVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }
}
