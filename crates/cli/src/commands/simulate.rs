//! Single-run simulation command.
//!
//! Runs one betting path and prints its summary next to the closed-form
//! expectations. With `--history-csv` every round is exported and the round
//! history is analyzed for streaks and bet performance.

use anyhow::Result;
use clap::Args;

use rollquest_core::AppConfig;
use rollquest_simulation::{
    BetReport, MonteCarloSimulator, SimulationResult, StatisticalAnalyzer, StreakReport,
};

use super::output::{banner, emit, write_csv, write_json, OutputFormat, RULE};
use super::sim_args::SimulationArgs;

/// Arguments for the simulate command.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub sim: SimulationArgs,

    /// Output format: text, json
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Output JSON results to file
    #[arg(long)]
    pub output: Option<String>,

    /// Export every round to a CSV file
    #[arg(long)]
    pub history_csv: Option<String>,
}

pub fn run_simulate(args: SimulateArgs, config: &AppConfig) -> Result<()> {
    let format = OutputFormat::parse(&args.format)?;

    let mut sim = args.sim.to_config(config)?;
    sim.num_trials = config.simulation.clamp_trials(sim.num_trials);
    SimulationArgs::validate(&sim, config)?;
    if args.history_csv.is_some() {
        sim = sim.with_history();
    }

    tracing::info!(
        "Simulating {} rounds: balance {:.2}, bet {:.2}, strategy {}",
        sim.num_trials,
        sim.starting_balance,
        sim.bet_amount,
        sim.strategy
    );

    let simulator = MonteCarloSimulator::new(sim)?;
    let result = simulator.run();

    emit(format, &result, format_simulation)?;

    if let Some(path) = &args.history_csv {
        write_csv(path, &result.history)?;
    }
    if let Some(path) = &args.output {
        write_json(path, &result)?;
    }

    Ok(())
}

fn format_simulation(result: &SimulationResult) -> String {
    let summary = &result.summary;
    let theory = &result.theoretical;
    let params = &result.parameters;

    let mut output = banner("SIMULATION RESULTS");
    output.push_str(&format!(
        "Mode: {}   Strategy: {}   Bet Face: {}\n",
        params.game_mode,
        params.bet_strategy,
        params
            .target_face
            .map_or_else(|| "random".to_string(), |f| f.to_string())
    ));
    output.push_str(&format!(
        "Starting Balance: ${:.2}   Base Bet: ${:.2}   Payout: {}x\n\n",
        params.starting_balance, params.bet_amount, params.payout
    ));

    output.push_str("OUTCOME\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(
        "Rounds Played:  {} of {}\n",
        summary.total_rounds, params.num_trials
    ));
    output.push_str(&format!(
        "Wins / Losses:  {} / {}\n",
        summary.wins, summary.losses
    ));
    output.push_str(&format!("Win Rate:       {:.2}%\n", summary.win_rate));
    output.push_str(&format!("Final Balance:  ${:.2}\n", summary.final_balance));
    output.push_str(&format!(
        "Profit:         ${:.2} ({:+.2}%)\n",
        summary.profit, summary.profit_percentage
    ));
    output.push_str(&format!(
        "Balance Range:  ${:.2} - ${:.2}\n",
        summary.min_balance, summary.max_balance
    ));
    if summary.went_bankrupt {
        output.push_str("Status:         BANKRUPT\n");
    }
    if summary.reached_balance_ceiling {
        output.push_str("Status:         BALANCE CEILING REACHED\n");
    }
    output.push('\n');

    output.push_str("THEORETICAL\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!(
        "Win Probability: {:.2}%\n",
        theory.expected_win_prob
    ));
    output.push_str(&format!(
        "EV per Bet:      ${:.4}\n",
        theory.expected_value_per_bet
    ));
    output.push_str(&format!("House Edge:      {:.2}%\n", theory.house_edge));
    output.push_str(&format!(
        "Kelly Fraction:  {:.4} ({})\n",
        theory.kelly.fraction,
        theory.kelly.reason.as_str()
    ));
    output.push_str(&format!(
        "Die E[X]:        {:.4} (Var {:.4})\n\n",
        theory.dice_expected_value, theory.dice_variance
    ));

    output.push_str("FACE DISTRIBUTION\n");
    output.push_str(RULE);
    output.push('\n');
    for (face, count) in &result.face_distribution {
        output.push_str(&format!("{face}: {count}\n"));
    }

    if !result.history.is_empty() {
        let analyzer = StatisticalAnalyzer::new(&result.history);
        output.push('\n');
        output.push_str(&format_streaks(&analyzer.streak_analysis()));
        output.push('\n');
        output.push_str(&format_bets(&analyzer.bet_analysis()));
    }

    output
}

/// Streak section shared with the play command.
pub fn format_streaks(streaks: &StreakReport) -> String {
    let mut output = String::from("STREAKS\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!("Current:        {:+}\n", streaks.current_streak));
    output.push_str(&format!("Longest Win:    {}\n", streaks.max_win_streak));
    output.push_str(&format!("Longest Loss:   {}\n", streaks.max_lose_streak));
    let recent: Vec<String> = streaks
        .streak_history
        .iter()
        .map(|s| format!("{s:+}"))
        .collect();
    output.push_str(&format!("Recent:         {}\n", recent.join(" ")));
    output
}

/// Bet analysis section shared with the play command.
pub fn format_bets(bets: &BetReport) -> String {
    let mut output = String::from("BETS\n");
    output.push_str(RULE);
    output.push('\n');
    output.push_str(&format!("Total Wagered:  ${:.2}\n", bets.total_wagered));
    output.push_str(&format!("Total Returned: ${:.2}\n", bets.total_won));
    output.push_str(&format!("Average Bet:    ${:.2}\n", bets.avg_bet));
    for (face, perf) in &bets.bet_face_performance {
        output.push_str(&format!(
            "Face {}: {} bets, {} wins ({:.1}%)\n",
            face, perf.times_bet, perf.wins, perf.win_rate
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollquest_simulation::SimulationConfig;

    #[test]
    fn report_contains_key_sections() {
        let config = SimulationConfig::new(100, 1_000.0, 10.0).with_seed(1);
        let result = MonteCarloSimulator::new(config).unwrap().run();

        let report = format_simulation(&result);
        assert!(report.contains("SIMULATION RESULTS"));
        assert!(report.contains("Bet Face: random"));
        assert!(report.contains("THEORETICAL"));
        assert!(report.contains("FACE DISTRIBUTION"));
        assert!(!report.contains("STREAKS"));
    }

    #[test]
    fn report_with_history_includes_analysis() {
        let config = SimulationConfig::new(50, 1_000.0, 10.0)
            .with_target_face(3)
            .with_seed(2)
            .with_history();
        let result = MonteCarloSimulator::new(config).unwrap().run();

        let report = format_simulation(&result);
        assert!(report.contains("Bet Face: 3"));
        assert!(report.contains("STREAKS"));
        assert!(report.contains("Face 3: 50 bets"));
    }

    #[test]
    fn bankrupt_run_is_flagged() {
        let config = SimulationConfig::new(100, 20.0, 10.0)
            .with_target_face(1)
            .with_probabilities(vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0])
            .with_seed(3);
        let result = MonteCarloSimulator::new(config).unwrap().run();

        assert!(format_simulation(&result).contains("BANKRUPT"));
    }

    #[test]
    fn runaway_kelly_run_reports_ceiling() {
        let config = SimulationConfig::new(2_000, 1_000.0, 10.0)
            .with_strategy(rollquest_simulation::BetStrategy::Kelly)
            .with_target_face(1)
            .with_probabilities(vec![9.0, 0.2, 0.2, 0.2, 0.2, 0.2])
            .with_seed(1);
        let result = MonteCarloSimulator::new(config).unwrap().run();

        let report = format_simulation(&result);
        assert!(report.contains("BALANCE CEILING REACHED"));
        assert!(report.contains("Kelly Fraction:  0.8800 (positive edge)"));
        assert!(!report.contains("NaN"));
    }
}
