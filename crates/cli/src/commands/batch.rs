//! Batch risk analysis command.
//!
//! Runs many independent paths with the same parameters and reports the
//! spread of outcomes: ruin probability, profit distribution and a histogram.

use anyhow::Result;
use clap::Args;

use rollquest_core::AppConfig;
use rollquest_simulation::{BatchResult, MonteCarloSimulator};

use super::output::{banner, emit, write_json, OutputFormat, RULE};
use super::sim_args::SimulationArgs;

const HISTOGRAM_WIDTH: usize = 40;

/// Arguments for the batch command.
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Number of independent simulations
    #[arg(long, default_value = "100")]
    pub simulations: usize,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Output JSON results to file
    #[arg(long)]
    pub output: Option<String>,
}

pub fn run_batch(args: BatchArgs, config: &AppConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;

    let mut sim = args.sim.to_config(config)?;
    let (simulations, trials) = config
        .simulation
        .clamp_batch(args.simulations, sim.num_trials);
    sim.num_trials = trials;

    tracing::info!(
        "Running {} simulations of {} rounds each",
        simulations,
        trials
    );

    let batch = MonteCarloSimulator::new(sim)?.batch_simulation(simulations)?;

    emit(format, &batch, format_batch)?;
    if let Some(path) = &args.output {
        write_json(path, &batch)?;
    }
    Ok(())
}

fn format_batch(batch: &BatchResult) -> String {
    let stats = &batch.statistics;

    let mut output = banner("BATCH SIMULATION");
    output.push_str(&format!(
        "Simulations: {}   Rounds each: {}\n\n",
        batch.num_simulations, batch.trials_per_simulation
    ));

    output.push_str("RISK\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(
        "Ruin Probability:   {:.2}%\n",
        stats.ruin_probability
    ));
    output.push_str(&format!(
        "Value at Risk (5%): ${:.2}\n",
        stats.value_at_risk_5
    ));
    output.push_str(&format!(
        "Balance Ceiling:    {:.2}%\n\n",
        stats.ceiling_probability
    ));

    output.push_str("OUTCOMES\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(
        "Mean Profit:        ${:.2} (std ${:.2})\n",
        stats.mean_profit, stats.std_profit
    ));
    output.push_str(&format!("Median Profit:      ${:.2}\n", stats.median_profit));
    output.push_str(&format!(
        "Mean Final Balance: ${:.2} (std ${:.2})\n",
        stats.mean_final_balance, stats.std_final_balance
    ));
    output.push_str(&format!("Mean Win Rate:      {:.2}%\n\n", stats.mean_win_rate));

    output.push_str("PROFIT PERCENTILES\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!("{:>5}  ${:.2}\n", "min", stats.min_profit));
    for (p, value) in &stats.profit_percentiles {
        output.push_str(&format!("{:>4.0}%  ${:.2}\n", p * 100.0, value));
    }
    output.push_str(&format!("{:>5}  ${:.2}\n\n", "max", stats.max_profit));

    output.push_str("PROFIT HISTOGRAM\n");
    output.push_str(RULE);
    output.push('\n');
    let histogram = &batch.distribution.histogram;
    let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
    for (count, edges) in histogram.counts.iter().zip(histogram.bins.windows(2)) {
        let bar = "#".repeat(count * HISTOGRAM_WIDTH / peak);
        output.push_str(&format!(
            "{:>12.2} .. {:>12.2} | {:<width$} {}\n",
            edges[0],
            edges[1],
            bar,
            count,
            width = HISTOGRAM_WIDTH
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollquest_simulation::SimulationConfig;

    #[test]
    fn report_contains_histogram_rows() {
        let config = SimulationConfig::new(50, 500.0, 10.0).with_seed(4);
        let batch = MonteCarloSimulator::new(config)
            .unwrap()
            .batch_simulation(30)
            .unwrap();

        let text = format_batch(&batch);
        assert!(text.contains("Simulations: 30"));
        assert!(text.contains("Ruin Probability"));
        assert!(text.contains("PROFIT PERCENTILES"));
        assert!(text.contains("  95%  $"));
        assert_eq!(text.lines().filter(|l| l.contains(" | ")).count(), 20);
    }
}
