//! beamsim command-line front end.
//!
//! Runs simulations, explains stored runs, and exposes stored records as
//! `simulations://` resources.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use beamsim::{load_config, logging, RunResponse, SimulationService};

#[derive(Parser)]
#[command(
    name = "beamsim",
    version,
    about = "Deterministic beam search simulator"
)]
struct Cli {
    /// Configuration file (TOML), layered over ./beamsim.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulation and store the result.
    Run {
        /// Scenario JSON file, or `-` for stdin.
        #[arg(long)]
        scenario: PathBuf,
        /// Constraints JSON file.
        #[arg(long)]
        constraints: Option<PathBuf>,
        /// Candidates kept per step.
        #[arg(long)]
        beam_width: Option<u64>,
        /// Maximum simulation steps.
        #[arg(long)]
        max_steps: Option<u64>,
        /// Seed for reproducible runs.
        #[arg(long, allow_hyphen_values = true)]
        seed: Option<i64>,
    },
    /// Explain a stored run.
    Explain {
        run_id: String,
    },
    /// List stored runs as resource URIs.
    List,
    /// Print the stored record behind a `simulations://<run_id>` URI.
    Read {
        uri: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    logging::init(&config.logging.filter);
    let service = SimulationService::from_config(&config).context("opening run store")?;

    match cli.command {
        Command::Run {
            scenario,
            constraints,
            beam_width,
            max_steps,
            seed,
        } => {
            let mut args = json!({ "scenario": read_json(&scenario)? });
            if let Some(path) = constraints {
                args["constraints"] = read_json(&path)?;
            }
            if let Some(n) = beam_width {
                args["beamWidth"] = json!(n);
            }
            if let Some(n) = max_steps {
                args["maxSteps"] = json!(n);
            }
            if let Some(seed) = seed {
                args["seed"] = json!(seed);
            }
            let result = service.run(&args)?;
            println!("{}", serde_json::to_string_pretty(&RunResponse::from(&result))?);
        }
        Command::Explain { run_id } => {
            println!("{}", service.explain(&run_id)?);
        }
        Command::List => {
            for resource in service.list_resources()? {
                println!("{}", resource.uri);
            }
        }
        Command::Read { uri } => {
            println!("{}", service.read_resource(&uri)?);
        }
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
