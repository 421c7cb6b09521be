//! Terminal formatting for scoring results and artifact summaries.
//!
//! We keep formatting code in one place so:
//! - the scoring code stays free of presentation concerns
//! - output changes are localized (CLI and TUI share the helpers)

use crate::domain::{Advisory, ApplicantInput, FeatureValue, FeatureVector, ScoringResult, tier_cuts};
use crate::features::source_of;
use crate::io::Artifact;

/// Currency unit appended to every amount.
pub const CURRENCY_UNIT: &str = "COP";

/// `$ 1.234.567 COP`: rounded to whole units, `.` as thousands separator.
pub fn fmt_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("$ {amount} {CURRENCY_UNIT}");
    }
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("$ {sign}{grouped} {CURRENCY_UNIT}")
}

/// Ratio as a percentage with one decimal.
pub fn fmt_pct(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

pub fn verdict_line(result: &ScoringResult) -> &'static str {
    if result.predicted_label {
        "HIGH PROBABILITY OF WITHDRAWAL (at or above the threshold)"
    } else {
        "client PROBABLY DOES NOT WITHDRAW (below the threshold)"
    }
}

/// Format advisories as `!`/`i` prefixed lines; empty string when none.
pub fn format_advisories(advisories: &[Advisory]) -> String {
    let mut out = String::new();
    for a in advisories {
        let marker = if a.is_warning() { "!" } else { "i" };
        out.push_str(&format!("[{marker}] {}\n", a.message()));
    }
    out
}

/// Format the applicant inputs as entered.
pub fn format_inputs(input: &ApplicantInput) -> String {
    let mut out = String::new();
    out.push_str("Applicant:\n");
    out.push_str(&format!("- income    : {}\n", fmt_currency(input.income)));
    out.push_str(&format!("- expenses  : {}\n", fmt_currency(input.expenses)));
    out.push_str(&format!("- requested : {}\n", fmt_currency(input.requested_amount)));
    out.push_str(&format!("- dependents: {}\n", input.dependents));
    out.push_str(&format!("- contract  : {}\n", input.contract_type.display_name()));
    out
}

/// Format the model outcome plus the main signals behind it.
pub fn format_result(result: &ScoringResult) -> String {
    let mut out = String::new();

    out.push_str("=== Model result ===\n");
    out.push_str(&format!("Withdrawal probability: {}\n", fmt_pct(result.probability)));
    out.push_str(&format!("Risk tier: {}\n", result.tier.display_name()));
    out.push_str(&format!("Suggested action: {}\n", result.suggested_action));
    out.push_str(&format!("Verdict: {}\n", verdict_line(result)));
    out.push_str(&format!("Threshold used: {:.2}\n", result.threshold));

    let r = &result.ratios;
    out.push_str("\nMain signals:\n");
    out.push_str(&format!("- payment capacity: {}\n", fmt_currency(r.payment_capacity)));
    out.push_str(&format!("- debt ratio (expenses/income): {}\n", fmt_pct(r.debt_ratio)));
    out.push_str(&format!("- request/income ratio: {}\n", fmt_pct(r.request_income_ratio)));
    out.push_str(&format!("- financial stress (sum of ratios): {}\n", fmt_pct(r.financial_stress)));

    out
}

/// Format the exact row sent to the classifier as a two-column table.
pub fn format_feature_row(row: &FeatureVector) -> String {
    let width = row.names().map(|n| n.chars().count()).max().unwrap_or(0).max(7);
    let mut out = String::new();
    out.push_str(format!("{:<width$} {}\n", "feature", "value").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<width$} {:-<16}\n", "", "").trim_end());
    out.push('\n');
    for (name, value) in row.iter() {
        out.push_str(&format!("{name:<width$} {}\n", fmt_feature_value(value)));
    }
    out
}

pub fn fmt_feature_value(value: &FeatureValue) -> String {
    match value {
        FeatureValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
        FeatureValue::Number(v) => format!("{v:.6}"),
        other => other.to_string(),
    }
}

/// Format the artifact summary for `desist inspect`.
pub fn format_artifact_summary(artifact: &Artifact) -> String {
    let mut out = String::new();
    let meta = artifact.meta();
    let (low_cut, high_cut) = tier_cuts(artifact.threshold());

    out.push_str(&format!("=== {} ===\n", artifact.display_name()));
    if let Some(path) = &meta.source {
        out.push_str(&format!("Path: {}\n", path.display()));
    }
    if let Some(date) = meta.trained_on {
        out.push_str(&format!("Trained on: {date}\n"));
    }
    out.push_str(&format!("Classifier: {}\n", artifact.classifier().kind()));
    out.push_str(&format!("Threshold: {:.2}\n", artifact.threshold()));
    out.push_str(&format!(
        "Tiers: low < {low_cut:.4} <= medium < {high_cut:.4} <= high\n"
    ));

    let names = artifact.feature_names();
    let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0).max(7);
    out.push_str(&format!("\nFeature columns ({}):\n", names.len()));
    for (idx, name) in names.iter().enumerate() {
        out.push_str(&format!("{:>3}) {name:<width$} {}\n", idx + 1, source_of(name).label()));
    }
    out
}
