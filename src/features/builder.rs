//! Feature row assembly.
//!
//! The artifact dictates which columns the classifier expects and in which
//! order. Each column is resolved by walking a fixed chain of resolvers:
//!
//! 1. raw applicant fields
//! 2. derived ratios
//! 3. the missing-value sentinel
//!
//! A column nobody can supply is not an error: the classifier sees a missing
//! value, which keeps the builder usable with artifacts trained on a subset or
//! a superset of the known columns.

use serde::Serialize;

use crate::domain::{ApplicantInput, DerivedRatios, FeatureValue, FeatureVector};

/// Column names used by the training pipeline.
pub mod columns {
    pub const INCOME: &str = "INGRESOS";
    pub const EXPENSES: &str = "EGRESOS";
    pub const REQUESTED_AMOUNT: &str = "VALOR_SOLICITADO";
    pub const DEPENDENTS: &str = "PERSONAS_CARGO";
    pub const CONTRACT_TYPE: &str = "TIPO_CONTRATO";

    pub const PAYMENT_CAPACITY: &str = "CAPACIDAD_PAGO";
    pub const DEBT_RATIO: &str = "RATIO_ENDEUDAMIENTO";
    pub const REQUEST_INCOME_RATIO: &str = "RATIO_SOLICITUD_INGRESO";
    /// The training column carries a doubled trailing `O`.
    pub const FINANCIAL_STRESS: &str = "ESTRES_FINANCIEROO";
}

/// Which link of the resolver chain supplied a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSource {
    Raw,
    Derived,
    Missing,
}

impl FeatureSource {
    pub fn label(self) -> &'static str {
        match self {
            FeatureSource::Raw => "raw",
            FeatureSource::Derived => "derived",
            FeatureSource::Missing => "missing",
        }
    }
}

/// Everything a resolver may read.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub input: &'a ApplicantInput,
    pub ratios: &'a DerivedRatios,
}

/// One link of the resolver chain.
#[derive(Clone, Copy)]
pub struct Resolver {
    pub source: FeatureSource,
    pub resolve: fn(&str, &ResolveContext<'_>) -> Option<FeatureValue>,
}

/// Resolvers in precedence order. Anything they all decline is `Missing`.
pub const RESOLVER_CHAIN: [Resolver; 2] = [
    Resolver {
        source: FeatureSource::Raw,
        resolve: resolve_raw,
    },
    Resolver {
        source: FeatureSource::Derived,
        resolve: resolve_derived,
    },
];

/// Raw applicant fields.
pub fn resolve_raw(name: &str, ctx: &ResolveContext<'_>) -> Option<FeatureValue> {
    let input = ctx.input;
    let value = match name {
        columns::INCOME => FeatureValue::Number(input.income),
        columns::EXPENSES => FeatureValue::Number(input.expenses),
        columns::REQUESTED_AMOUNT => FeatureValue::Number(input.requested_amount),
        columns::DEPENDENTS => FeatureValue::Number(f64::from(input.dependents)),
        columns::CONTRACT_TYPE => {
            FeatureValue::Category(input.contract_type.training_label().to_string())
        }
        _ => return None,
    };
    Some(value)
}

/// Ratio features.
pub fn resolve_derived(name: &str, ctx: &ResolveContext<'_>) -> Option<FeatureValue> {
    let r = ctx.ratios;
    let value = match name {
        columns::PAYMENT_CAPACITY => r.payment_capacity,
        columns::DEBT_RATIO => r.debt_ratio,
        columns::REQUEST_INCOME_RATIO => r.request_income_ratio,
        columns::FINANCIAL_STRESS => r.financial_stress,
        _ => return None,
    };
    Some(FeatureValue::Number(value))
}

/// Resolve one column through the chain.
pub fn resolve(name: &str, ctx: &ResolveContext<'_>) -> (FeatureSource, FeatureValue) {
    RESOLVER_CHAIN
        .iter()
        .find_map(|r| (r.resolve)(name, ctx).map(|v| (r.source, v)))
        .unwrap_or((FeatureSource::Missing, FeatureValue::Missing))
}

/// Which source would supply `name`, independent of the applicant's values.
pub fn source_of(name: &str) -> FeatureSource {
    let input = ApplicantInput::default();
    let ratios = super::derive_ratios(&input);
    resolve(name, &ResolveContext { input: &input, ratios: &ratios }).0
}

/// Build the single-row feature vector for `feature_names`.
///
/// The result has exactly one entry per name, in the given order.
pub fn build_feature_vector(
    feature_names: &[String],
    input: &ApplicantInput,
    ratios: &DerivedRatios,
) -> FeatureVector {
    let ctx = ResolveContext { input, ratios };
    let mut row = FeatureVector::with_capacity(feature_names.len());
    for name in feature_names {
        let (_, value) = resolve(name, &ctx);
        row.push(name.clone(), value);
    }
    row
}
