//! Fair versus tweaked comparison command.
//!
//! Runs the same parameters once with a fair die and once with the given
//! weights, then compares the two summaries metric by metric.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use rollquest_core::AppConfig;
use rollquest_simulation::{
    Advantage, ModeComparison, MonteCarloSimulator, SimulationResult, StatisticalAnalyzer,
};

use super::output::{banner, emit, OutputFormat, RULE};
use super::sim_args::SimulationArgs;

/// Arguments for the compare command.
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Simulation parameters; --weights sets the tweaked die and is required
    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Both runs and their comparison.
#[derive(Debug, Serialize)]
pub struct CompareOutput {
    pub fair: SimulationResult,
    pub tweaked: SimulationResult,
    pub comparison: ModeComparison,
}

pub fn run_compare(args: CompareArgs, config: &AppConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;
    if args.sim.weights.is_none() {
        bail!("--weights is required to define the tweaked die");
    }

    let mut tweaked = args.sim.to_config(config)?;
    tweaked.num_trials = config.simulation.clamp_trials(tweaked.num_trials);
    SimulationArgs::validate(&tweaked, config)?;

    let mut fair = tweaked.clone();
    fair.probabilities = None;

    let fair = MonteCarloSimulator::new(fair)?.run();
    let tweaked = MonteCarloSimulator::new(tweaked)?.run();
    let comparison = StatisticalAnalyzer::compare_modes(&fair, &tweaked);

    tracing::info!("{}", comparison.conclusion);

    let output = CompareOutput {
        fair,
        tweaked,
        comparison,
    };
    emit(format, &output, |o| format_comparison(&o.comparison))
}

fn format_comparison(comparison: &ModeComparison) -> String {
    let mut output = banner("FAIR VS TWEAKED");
    output.push_str(&format!(
        "{:<16} {:>14} {:>14} {:>14}   Better\n",
        "Metric",
        comparison.first_mode.to_string(),
        comparison.second_mode.to_string(),
        "Difference"
    ));
    output.push_str(RULE);
    output.push('\n');
    for metric in &comparison.metrics {
        let better = match metric.better {
            Advantage::First => comparison.first_mode.to_string(),
            Advantage::Second => comparison.second_mode.to_string(),
            Advantage::Equal => "equal".to_string(),
        };
        output.push_str(&format!(
            "{:<16} {:>14.2} {:>14.2} {:>14.2}   {}\n",
            metric.metric, metric.first, metric.second, metric.difference, better
        ));
    }
    output.push('\n');
    output.push_str(&comparison.conclusion);
    output.push('\n');
    output
}
