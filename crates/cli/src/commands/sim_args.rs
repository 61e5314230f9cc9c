//! Simulation parameters shared by the simulate, convergence, batch and compare commands.

use anyhow::Result;
use clap::Args;

use rollquest_core::AppConfig;
use rollquest_simulation::{BetStrategy, SimulationConfig};

use super::output::parse_list;

#[derive(Args, Debug, Clone)]
pub struct SimulationArgs {
    /// Number of rounds per simulation (default from config)
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// Starting balance (default from config)
    #[arg(long)]
    pub balance: Option<f64>,

    /// Base bet per round
    #[arg(long, default_value = "10")]
    pub bet: f64,

    /// Bet strategy: fixed, martingale, anti_martingale, kelly
    #[arg(short, long, default_value = "fixed")]
    pub strategy: String,

    /// Always bet on this face (1-6); a random face each round if omitted
    #[arg(long)]
    pub face: Option<u8>,

    /// Six comma-separated die weights, e.g. "1,1,1,1,1,3" (fair die if omitted)
    #[arg(short, long)]
    pub weights: Option<String>,

    /// Seed for reproducible runs
    #[arg(long, env = "ROLLQUEST_SEED")]
    pub seed: Option<u64>,
}

impl SimulationArgs {
    /// Builds an engine configuration, filling defaults from `config`.
    ///
    /// The trial count is returned uncapped; each command applies its own limit.
    pub fn to_config(&self, config: &AppConfig) -> Result<SimulationConfig> {
        let strategy: BetStrategy = self.strategy.parse()?;
        let trials = self.trials.unwrap_or(config.simulation.default_trials);
        let balance = self.balance.unwrap_or(config.game.default_balance);

        let mut sim = SimulationConfig::new(trials, balance, self.bet)
            .with_strategy(strategy)
            .with_payout(config.game.payout_multiplier);
        if let Some(face) = self.face {
            sim = sim.with_target_face(face);
        }
        if let Some(weights) = self.weights()? {
            sim = sim.with_probabilities(weights);
        }
        if let Some(seed) = self.seed {
            sim = sim.with_seed(seed);
        }
        Ok(sim)
    }

    /// Parsed `--weights`, if given.
    pub fn weights(&self) -> Result<Option<Vec<f64>>> {
        self.weights
            .as_deref()
            .map(|w| parse_list(w, "weight"))
            .transpose()
    }

    /// Checks the run against the configured minimums.
    pub fn validate(sim: &SimulationConfig, config: &AppConfig) -> Result<()> {
        config
            .simulation
            .validate_run(sim.num_trials, sim.starting_balance, sim.bet_amount)?;
        Ok(())
    }
}
