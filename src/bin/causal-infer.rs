//! Command-line front end: reads a JSON request, prints the JSON response.
use causal_effect_core::bindings::{self, InferenceRequest, SimultaneousRequest};
use causal_effect_core::display::{format_report, format_simultaneous_report};
use causal_effect_core::inference::{CausalInference, InferenceMode, SimultaneousCausalInference};
use causal_effect_core::store::Dataset;
use causal_effect_core::{EstimatorConfig, Result};
use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process;

/// Estimate causal effects from a tabular dataset and a causal graph
#[derive(Debug, Parser)]
#[command(name = "causal-infer", version)]
struct Cli {
    /// JSON request file
    request: PathBuf,

    /// Treat the request as a multi-treatment request
    #[arg(long)]
    simultaneous: bool,

    /// JSON file with estimator settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed of the propensity model's train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Share of rows held out to score the propensity model
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Print an audit report of the identification to stderr
    #[arg(long)]
    report: bool,
}

fn run(cli: &Cli) -> Result<String> {
    let mut config = match &cli.config {
        Some(path) => EstimatorConfig::from_json_file(path)?,
        None => EstimatorConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(fraction) = cli.test_fraction {
        config.test_fraction = fraction;
    }
    config.validate()?;

    let text = std::fs::read_to_string(&cli.request)?;
    if cli.simultaneous {
        let request: SimultaneousRequest = serde_json::from_str(&text)?;
        if cli.report {
            let dataset = Dataset::from_table(&request.table)?;
            let graph = request.graph.as_ref().map(|g| g.to_graph()).transpose()?;
            let inference =
                SimultaneousCausalInference::new(&dataset, &request.treatments, &request.outcome, graph.as_ref())?
                    .with_config(config.clone());
            eprint!("{}", format_simultaneous_report(&inference)?);
        }
        let response = bindings::handle_simultaneous(&request, &config)?;
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        let request: InferenceRequest = serde_json::from_str(&text)?;
        if cli.report {
            let dataset = Dataset::from_table(&request.table)?;
            let graph = request.graph.to_graph()?;
            let inference = CausalInference::new(&dataset, &graph, &request.treatment, &request.outcome)?
                .with_config(config.clone());
            eprint!("{}", format_report(&inference, &InferenceMode::ALL)?);
        }
        let response = bindings::handle(&request, &config)?;
        Ok(serde_json::to_string_pretty(&response)?)
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
