//! Command-line parsing for the desistance scorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scoring code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{ApplicantInput, ContractType};
use crate::io::DEFAULT_ARTIFACT_PATH;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "desist", version, about = "Client desistance probability scorer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score one applicant and print probability, tier and suggested action.
    Score(ScoreArgs),
    /// Describe the model artifact: threshold, tier cuts and feature columns.
    Inspect(ArtifactArgs),
    /// Launch the interactive form.
    ///
    /// This uses the same scoring path as `desist score`, but collects the
    /// inputs and renders results in a terminal UI using Ratatui.
    Tui(ArtifactArgs),
}

/// Where to find the model artifact.
#[derive(Debug, Args, Clone)]
pub struct ArtifactArgs {
    /// Model artifact (JSON). Also read from `DESIST_ARTIFACT` / `.env`.
    #[arg(long, env = "DESIST_ARTIFACT", default_value = DEFAULT_ARTIFACT_PATH, value_name = "JSON")]
    pub artifact: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Applicant inputs and output options for `desist score`.
#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// Monthly income.
    #[arg(long, default_value_t = 2_000_000.0, value_parser = non_negative_amount)]
    pub income: f64,

    /// Monthly expenses.
    #[arg(long, default_value_t = 1_000_000.0, value_parser = non_negative_amount)]
    pub expenses: f64,

    /// Requested credit amount.
    #[arg(long, default_value_t = 3_000_000.0, value_parser = non_negative_amount)]
    pub requested: f64,

    /// Number of dependents.
    #[arg(long, default_value_t = 1)]
    pub dependents: u32,

    /// Employment contract type.
    #[arg(long, value_enum, default_value_t = ContractType::Other)]
    pub contract: ContractType,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Also print the feature row sent to the model (text format).
    #[arg(long)]
    pub debug: bool,
}

impl ScoreArgs {
    pub fn applicant(&self) -> ApplicantInput {
        ApplicantInput {
            income: self.income,
            expenses: self.expenses,
            requested_amount: self.requested,
            dependents: self.dependents,
            contract_type: self.contract,
        }
    }
}

/// Amounts must be finite and `>= 0`.
pub fn non_negative_amount(raw: &str) -> Result<f64, String> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("'{raw}' is not a number: {e}"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("'{raw}' must be a finite amount >= 0"));
    }
    Ok(v)
}
