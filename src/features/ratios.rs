//! Closed-form ratio features.
//!
//! The classifier was trained on four ratios derived from income, expenses and
//! the requested amount:
//!
//! - `payment_capacity = income - expenses`
//! - `debt_ratio = expenses / (income + ε)`
//! - `request_income_ratio = requested_amount / (income + ε)`
//! - `financial_stress = debt_ratio + request_income_ratio`
//!
//! Numerical notes:
//! - `ε` is added to every income denominator so that `income = 0` yields a
//!   large but finite ratio instead of `inf`/`NaN`. The training pipeline used
//!   the same guard, so it must stay exactly `1e-6`.

use crate::domain::{ApplicantInput, DerivedRatios};

/// Guard added to income before dividing by it.
pub const INCOME_EPS: f64 = 1e-6;

/// Compute the derived ratios for an applicant.
pub fn derive_ratios(input: &ApplicantInput) -> DerivedRatios {
    let denom = input.income + INCOME_EPS;
    let debt_ratio = input.expenses / denom;
    let request_income_ratio = input.requested_amount / denom;

    DerivedRatios {
        payment_capacity: input.income - input.expenses,
        debt_ratio,
        request_income_ratio,
        financial_stress: debt_ratio + request_income_ratio,
    }
}
