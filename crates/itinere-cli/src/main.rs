use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use itinere_lib::{DEFAULT_CELL_SIZE, PORT_SEARCH_RADIUS_KM};

mod commands;

use commands::build::{handle_build, BuildArgs};
use commands::inspect::{handle_inspect, InspectArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build and inspect itinere routing graphs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the routing graph artifact from newline-delimited GeoJSON features.
    Build {
        /// Input features. Falls back to $ITINERE_INPUT, then roman_roads.ndjson.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Artifact destination. Falls back to $ITINERE_OUTPUT, then itinere_graph.json.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Spatial grid cell size in degrees.
        #[arg(long, default_value_t = DEFAULT_CELL_SIZE)]
        cell_size: f64,
        /// Maximum distance in kilometres between a sea endpoint and its port.
        #[arg(long, default_value_t = PORT_SEARCH_RADIUS_KM)]
        port_radius_km: f64,
        /// Skip bridging sea lanes to the land network.
        #[arg(long)]
        no_ports: bool,
        /// Print the build report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Load a graph artifact, verify its invariants and print a summary.
    Inspect {
        /// Artifact to inspect. Falls back to $ITINERE_OUTPUT, then itinere_graph.json.
        artifact: Option<PathBuf>,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            input,
            output,
            cell_size,
            port_radius_km,
            no_ports,
            json,
        } => handle_build(&BuildArgs {
            input,
            output,
            cell_size,
            port_radius_km,
            bridge_ports: !no_ports,
            json,
        }),
        Command::Inspect { artifact, json } => handle_inspect(&InspectArgs { artifact, json }),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
