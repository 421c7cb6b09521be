//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - loads the model artifact once
//! - dispatches to the score / inspect / TUI front-ends

use std::path::Path;

use clap::Parser;

use crate::cli::{ArtifactArgs, Command, OutputFormat, ScoreArgs};
use crate::error::AppError;
use crate::io::{Artifact, load_artifact};
use pipeline::Assessment;

pub mod pipeline;

/// Entry point for the `desist` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may set DESIST_ARTIFACT; a missing file is fine.
    dotenvy::dotenv().ok();

    // We want `desist` and `desist --artifact m.json` to behave like `desist tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    crate::logging::init(matches!(cli.command, Command::Tui(_)));

    match cli.command {
        Command::Score(args) => handle_score(args),
        Command::Inspect(args) => handle_inspect(args),
        Command::Tui(args) => handle_tui(args),
    }
}

/// Load the artifact named by the arguments. Failure is fatal for every command.
pub fn load(args: &ArtifactArgs) -> Result<Artifact, AppError> {
    load_from(&args.artifact)
}

fn load_from(path: &Path) -> Result<Artifact, AppError> {
    load_artifact(path).map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "artifact load failed");
        AppError::from(err)
    })
}

fn handle_score(args: ScoreArgs) -> Result<(), AppError> {
    let artifact = load(&args.artifact)?;
    let assessment = pipeline::assess(args.applicant(), &artifact)?;
    println!("{}", render_assessment(&assessment, args.format, args.debug)?);
    Ok(())
}

/// Render one assessment for stdout. `debug` appends the feature row to text output;
/// JSON always carries it under `result.features`.
fn render_assessment(assessment: &Assessment, format: OutputFormat, debug: bool) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(assessment)
            .map_err(|e| AppError::new(4, format!("Failed to encode result JSON: {e}"))),
        OutputFormat::Text => {
            let mut out = crate::report::format_inputs(&assessment.input);
            let advisories = crate::report::format_advisories(&assessment.advisories);
            if !advisories.is_empty() {
                out.push('\n');
                out.push_str(&advisories);
            }
            out.push('\n');
            out.push_str(&crate::report::format_result(&assessment.result));
            if debug {
                out.push_str("\nFeature row sent to the model:\n");
                out.push_str(&crate::report::format_feature_row(&assessment.result.features));
            }
            Ok(out.trim_end().to_string())
        }
    }
}

fn handle_inspect(args: ArtifactArgs) -> Result<(), AppError> {
    let artifact = load(&args)?;
    println!("{}", crate::report::format_artifact_summary(&artifact));
    Ok(())
}

fn handle_tui(args: ArtifactArgs) -> Result<(), AppError> {
    // Load before touching the terminal so a bad artifact prints a plain error.
    let artifact = load(&args)?;
    crate::tui::run(&artifact)
}

/// Rewrite argv so `desist` defaults to `desist tui`.
///
/// Rules:
/// - `desist`                      -> `desist tui`
/// - `desist --artifact m.json`    -> `desist tui --artifact m.json`
/// - `desist --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(args(&["desist"])), args(&["desist", "tui"]));
        assert_eq!(
            rewrite_args(args(&["desist", "--artifact", "m.json"])),
            args(&["desist", "tui", "--artifact", "m.json"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(args(&["desist", "--help"])), args(&["desist", "--help"]));
        assert_eq!(
            rewrite_args(args(&["desist", "score", "--income", "1"])),
            args(&["desist", "score", "--income", "1"])
        );
    }

    fn demo_assessment(input: crate::domain::ApplicantInput) -> Assessment {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("desistance_model.json");
        let artifact = load_from(&path).unwrap();
        pipeline::assess(input, &artifact).unwrap()
    }

    #[test]
    fn json_output_keeps_feature_columns_in_artifact_order() {
        let assessment = demo_assessment(crate::domain::ApplicantInput::default());
        let json = render_assessment(&assessment, OutputFormat::Json, false).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["result"]["features"]["INGRESOS"], 2_000_000.0);
        assert_eq!(value["result"]["features"]["TIPO_CONTRATO"], "Otra");
        assert_eq!(value["result"]["tier"], "high");
        assert!(value["result"]["features"].get("columns").is_none());

        let names: Vec<&str> = assessment.result.features.names().collect();
        assert_eq!(names.len(), 9);
        let positions: Vec<usize> = names
            .iter()
            .map(|n| json.find(&format!("\"{n}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn text_output_lists_inputs_result_and_optional_row() {
        let input = crate::domain::ApplicantInput {
            income: 0.0,
            ..crate::domain::ApplicantInput::default()
        };
        let assessment = demo_assessment(input);

        let plain = render_assessment(&assessment, OutputFormat::Text, false).unwrap();
        assert!(plain.starts_with("Applicant:"));
        assert!(plain.contains("Income of 0"));
        assert!(plain.contains("Risk tier: High"));
        assert!(!plain.contains("Feature row sent to the model"));

        let debug = render_assessment(&assessment, OutputFormat::Text, true).unwrap();
        assert!(debug.contains("Feature row sent to the model:"));
        assert!(debug.contains("ESTRES_FINANCIEROO"));
    }

    #[test]
    fn missing_artifact_is_fatal_with_exit_code_2() {
        let err = load_from(Path::new("/nonexistent/desist/model.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Cannot load model artifact"));
    }
}
