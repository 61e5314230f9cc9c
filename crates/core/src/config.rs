use serde::{Deserialize, Serialize};

use crate::error::{Result, RollQuestError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub simulation: SimulationLimits,
}

/// Table rules for interactive play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub default_balance: f64,
    pub min_bet: f64,
    pub max_bet: f64,
    pub max_funds_add: f64,
    pub payout_multiplier: f64,
    /// Number of most recent rounds a session keeps.
    pub history_limit: usize,
    pub max_player_name_len: usize,
}

/// Admission-control bounds applied before a simulation request reaches the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationLimits {
    pub default_trials: usize,
    pub max_trials: usize,
    pub min_trials: usize,
    pub min_starting_balance: f64,
    pub min_bet_amount: f64,
    pub max_convergence_trials: usize,
    pub convergence_checkpoints: usize,
    pub max_batch_simulations: usize,
    pub max_batch_trials: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            default_balance: 1000.0,
            min_bet: 1.0,
            max_bet: 10_000.0,
            max_funds_add: 100_000.0,
            payout_multiplier: crate::outcome::PAYOUT_MULTIPLIER,
            history_limit: 100,
            max_player_name_len: 20,
        }
    }
}

impl Default for SimulationLimits {
    fn default() -> Self {
        Self {
            default_trials: 10_000,
            max_trials: 1_000_000,
            min_trials: 100,
            min_starting_balance: 10.0,
            min_bet_amount: 1.0,
            max_convergence_trials: 100_000,
            convergence_checkpoints: 50,
            max_batch_simulations: 1_000,
            max_batch_trials: 10_000,
        }
    }
}

impl SimulationLimits {
    /// Caps a single-run trial count at `max_trials`.
    #[must_use]
    pub fn clamp_trials(&self, requested: usize) -> usize {
        clamp_logged("trials", requested, self.max_trials)
    }

    /// Caps a convergence-study trial count at `max_convergence_trials`.
    #[must_use]
    pub fn clamp_convergence_trials(&self, requested: usize) -> usize {
        clamp_logged("convergence trials", requested, self.max_convergence_trials)
    }

    /// Caps a batch request, returning `(simulations, trials_per_simulation)`.
    #[must_use]
    pub fn clamp_batch(&self, simulations: usize, trials: usize) -> (usize, usize) {
        (
            clamp_logged("batch simulations", simulations, self.max_batch_simulations),
            clamp_logged("batch trials", trials, self.max_batch_trials),
        )
    }

    /// Rejects single-run requests below the configured minimums.
    ///
    /// # Errors
    /// Returns `InvalidInput` naming the first violated minimum.
    pub fn validate_run(&self, trials: usize, starting_balance: f64, bet_amount: f64) -> Result<()> {
        if trials < self.min_trials {
            return Err(RollQuestError::InvalidInput(format!(
                "minimum {} trials required",
                self.min_trials
            )));
        }
        if starting_balance < self.min_starting_balance {
            return Err(RollQuestError::InvalidInput(format!(
                "starting balance must be at least {}",
                self.min_starting_balance
            )));
        }
        if bet_amount < self.min_bet_amount {
            return Err(RollQuestError::InvalidInput(format!(
                "bet amount must be at least {}",
                self.min_bet_amount
            )));
        }
        Ok(())
    }
}

fn clamp_logged(what: &str, requested: usize, max: usize) -> usize {
    if requested > max {
        tracing::warn!(requested, max, "{} capped at configured maximum", what);
        max
    } else {
        requested
    }
}
