//! Inspect command handler.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use itinere_lib::{resolve_output_path, GraphArtifact, GraphSummary};

/// Problems listed in text mode before the remainder is elided.
const MAX_LISTED_PROBLEMS: usize = 10;

/// Arguments for the inspect command.
#[derive(Debug, Clone)]
pub struct InspectArgs {
    pub artifact: Option<PathBuf>,
    /// Output in JSON format instead of human-readable text.
    pub json: bool,
}

/// Exit codes for the inspect command.
pub mod exit_codes {
    pub const MISSING: i32 = 2;
    pub const UNREADABLE: i32 = 3;
    pub const INVALID: i32 = 4;
}

/// JSON document printed by `inspect --json`.
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<GraphSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub problems: Vec<String>,
}

/// Handle the inspect subcommand.
///
/// Loads the artifact, checks its invariants and prints a summary. Exits with
/// a non-zero code from [`exit_codes`] when the artifact is missing,
/// unreadable or invalid.
pub fn handle_inspect(args: &InspectArgs) -> Result<()> {
    let path = resolve_output_path(args.artifact.as_deref());

    if !path.exists() {
        report_failure(args, &path, "artifact not found".to_string());
        std::process::exit(exit_codes::MISSING);
    }

    let artifact = match GraphArtifact::load(&path) {
        Ok(artifact) => artifact,
        Err(error) => {
            report_failure(args, &path, error.to_string());
            std::process::exit(exit_codes::UNREADABLE);
        }
    };

    let problems = artifact.problems();
    let output = InspectOutput {
        path: path.display().to_string(),
        valid: problems.is_empty(),
        summary: Some(artifact.summary()),
        problems,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_human_readable(&output);
    }

    if !output.valid {
        std::process::exit(exit_codes::INVALID);
    }
    Ok(())
}

fn report_failure(args: &InspectArgs, path: &Path, message: String) {
    let output = InspectOutput {
        path: path.display().to_string(),
        valid: false,
        summary: None,
        problems: vec![message],
    };
    if args.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(_) => eprintln!("{}", output.problems[0]),
        }
    } else {
        print_human_readable(&output);
    }
}

fn print_human_readable(output: &InspectOutput) {
    if output.valid {
        println!("✓ Graph artifact is valid");
    } else {
        println!("✗ Graph artifact is INVALID");
    }
    println!("  Path: {}", output.path);

    for problem in output.problems.iter().take(MAX_LISTED_PROBLEMS) {
        println!("  - {}", problem);
    }
    if output.problems.len() > MAX_LISTED_PROBLEMS {
        println!(
            "  ... and {} more",
            output.problems.len() - MAX_LISTED_PROBLEMS
        );
    }

    if let Some(summary) = &output.summary {
        print!("{}", summary.render_plain());
    }
}
