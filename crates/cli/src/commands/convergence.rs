//! Convergence study command.

use anyhow::Result;
use clap::Args;

use rollquest_core::AppConfig;
use rollquest_simulation::{ConvergenceReport, MonteCarloSimulator};

use super::output::{banner, emit, OutputFormat, RULE};
use super::sim_args::SimulationArgs;

/// Arguments for the convergence command.
#[derive(Args, Debug, Clone)]
pub struct ConvergenceArgs {
    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Number of checkpoints (default from config)
    #[arg(long)]
    pub checkpoints: Option<usize>,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,
}

pub fn run_convergence(args: ConvergenceArgs, config: &AppConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;

    let mut sim = args.sim.to_config(config)?;
    sim.num_trials = config.simulation.clamp_convergence_trials(sim.num_trials);
    let checkpoints = args
        .checkpoints
        .unwrap_or(config.simulation.convergence_checkpoints);

    let report = MonteCarloSimulator::new(sim)?.convergence_analysis(checkpoints);
    emit(format, &report, format_convergence)
}

fn format_convergence(report: &ConvergenceReport) -> String {
    let mut output = banner("CONVERGENCE ANALYSIS");
    output.push_str(&format!(
        "Target Face: {}   Theoretical: {:.4}%\n\n",
        report.target_face, report.theoretical_probability
    ));
    output.push_str("    Trials   Empirical        95% CI\n");
    output.push_str(RULE);
    output.push('\n');
    for ((trials, p), (lo, hi)) in report
        .trials
        .iter()
        .zip(&report.empirical_probabilities)
        .zip(&report.confidence_intervals)
    {
        output.push_str(&format!(
            "{trials:>10}   {p:>8.3}%   [{lo:.3}%, {hi:.3}%]\n"
        ));
    }
    output.push('\n');
    output.push_str(&format!(
        "Final Empirical:   {:.4}%\n",
        report.final_empirical
    ));
    output.push_str(&format!(
        "Convergence Error: {:.4} pp\n",
        report.convergence_error
    ));
    output
}
