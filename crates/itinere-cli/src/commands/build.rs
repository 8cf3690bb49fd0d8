//! Build command handler.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use itinere_lib::{resolve_input_path, resolve_output_path, run_build, BuildConfig};

/// Arguments for the build command.
#[derive(Debug, Clone)]
pub struct BuildArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub cell_size: f64,
    pub port_radius_km: f64,
    pub bridge_ports: bool,
    /// Print the report as JSON instead of text.
    pub json: bool,
}

/// Handle the build subcommand.
///
/// Reads the feature file, builds the graph and writes the artifact in one
/// shot. Any failure leaves the previous artifact (if any) untouched.
pub fn handle_build(args: &BuildArgs) -> Result<()> {
    let input = resolve_input_path(args.input.as_deref());
    let output = resolve_output_path(args.output.as_deref());
    debug!(input = %input.display(), output = %output.display(), "resolved build paths");

    let config = BuildConfig {
        cell_size: args.cell_size,
        port_radius_km: args.port_radius_km,
        bridge_ports: args.bridge_ports,
    };

    let report = run_build(&input, &output, &config).with_context(|| {
        format!(
            "failed to build routing graph from {} into {}",
            input.display(),
            output.display()
        )
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_plain());
        println!("Written to {}", output.display());
    }

    Ok(())
}
