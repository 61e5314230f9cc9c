//! Monte Carlo simulation of repeated single-face wagers on a weighted die.
//!
//! This module runs three kinds of study over one [`SimulationConfig`]:
//! a single betting path ([`MonteCarloSimulator::run`]), a convergence study of
//! the empirical hit rate of one face ([`MonteCarloSimulator::convergence_analysis`]),
//! and a batch of independent paths aggregated into ruin and profit
//! distributions ([`MonteCarloSimulator::batch_simulation`]).
//!
//! # Example
//!
//! ```
//! use rollquest_simulation::monte_carlo::{MonteCarloSimulator, SimulationConfig};
//! use rollquest_simulation::strategy::BetStrategy;
//!
//! let config = SimulationConfig::new(1_000, 1_000.0, 10.0)
//!     .with_strategy(BetStrategy::Martingale)
//!     .with_seed(42);
//! let simulator = MonteCarloSimulator::new(config).unwrap();
//!
//! let result = simulator.run();
//! assert!(result.summary.total_rounds <= 1_000);
//! ```

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use rollquest_core::{
    kelly, wald_ci, DiceMode, Die, Face, KellyDecision, Result, RollQuestError, RoundOutcome,
    FACES, FAIR_PROBABILITY, NUM_FACES, PAYOUT_MULTIPLIER, Z_95,
};

use crate::metrics::{DistributionSummary, Histogram};
use crate::strategy::{BetSizer, BetStrategy};

/// Balance trajectories longer than this are down-sampled.
pub const MAX_TRAJECTORY_POINTS: usize = 1_000;

/// Balance at which a path stops. A winning round that would carry the
/// balance past it is settled at exactly this value.
pub const BALANCE_CEILING: f64 = 1e15;

/// Number of bins in a batch profit histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Face tracked by a convergence study when no target face is configured.
pub const DEFAULT_CONVERGENCE_FACE: Face = 1;

/// Configuration for a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Maximum number of rounds per path.
    pub num_trials: usize,
    /// Starting balance.
    pub starting_balance: f64,
    /// Base bet amount.
    pub bet_amount: f64,
    /// Bet sizing strategy.
    pub strategy: BetStrategy,
    /// Face to always bet on; `None` picks a uniformly random face each round.
    pub target_face: Option<Face>,
    /// Raw die weights; `None` is a fair die.
    pub probabilities: Option<Vec<f64>>,
    /// Gross payout multiplier on a win.
    pub payout: f64,
    /// Optional seed for reproducible results.
    pub seed: Option<u64>,
    /// Keep a [`RoundOutcome`] for every round of [`MonteCarloSimulator::run`].
    pub record_history: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_trials: 10_000,
            starting_balance: 1_000.0,
            bet_amount: 10.0,
            strategy: BetStrategy::default(),
            target_face: None,
            probabilities: None,
            payout: PAYOUT_MULTIPLIER,
            seed: None,
            record_history: false,
        }
    }
}

impl SimulationConfig {
    /// Creates a new configuration with specified parameters.
    #[must_use]
    pub fn new(num_trials: usize, starting_balance: f64, bet_amount: f64) -> Self {
        Self {
            num_trials,
            starting_balance,
            bet_amount,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: BetStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_target_face(mut self, face: Face) -> Self {
        self.target_face = Some(face);
        self
    }

    /// Uses a tweaked die built from `weights`.
    #[must_use]
    pub fn with_probabilities(mut self, weights: Vec<f64>) -> Self {
        self.probabilities = Some(weights);
        self
    }

    #[must_use]
    pub fn with_payout(mut self, payout: f64) -> Self {
        self.payout = payout;
        self
    }

    /// Sets a seed for reproducible simulations.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_history(mut self) -> Self {
        self.record_history = true;
        self
    }
}

/// Outcome counters for one path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub total_rounds: u64,
    pub wins: u64,
    pub losses: u64,
    /// Percent of rounds won.
    pub win_rate: f64,
    pub final_balance: f64,
    pub profit: f64,
    pub profit_percentage: f64,
    pub max_balance: f64,
    pub min_balance: f64,
    pub went_bankrupt: bool,
    /// The path stopped because the balance reached [`BALANCE_CEILING`].
    pub reached_balance_ceiling: bool,
}

/// Closed-form expectations for the configured bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalSummary {
    /// Win probability of a single bet, in percent.
    pub expected_win_prob: f64,
    /// `(p · payout - 1) · base_bet`.
    pub expected_value_per_bet: f64,
    /// `(1 - p · payout) · 100`.
    pub house_edge: f64,
    pub dice_expected_value: f64,
    pub dice_variance: f64,
    /// Kelly evaluation of the bet, whichever strategy is in use.
    pub kelly: KellyDecision,
}

/// Snapshot of the configuration that produced a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub num_trials: usize,
    pub starting_balance: f64,
    pub bet_amount: f64,
    pub bet_strategy: BetStrategy,
    pub target_face: Option<Face>,
    pub payout: f64,
    pub game_mode: DiceMode,
    /// Normalized probabilities.
    pub probabilities: [f64; NUM_FACES],
}

/// Results from a single simulated path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub summary: SimulationSummary,
    pub theoretical: TheoreticalSummary,
    /// Rolled-face counts.
    pub face_distribution: BTreeMap<Face, u64>,
    /// Balance after each round (starting balance first), down-sampled to
    /// roughly [`MAX_TRAJECTORY_POINTS`].
    pub balance_trajectory: Vec<f64>,
    pub parameters: SimulationParameters,
    /// Every round played, when history recording was requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<RoundOutcome>,
}

/// Empirical hit rate of one face at increasing sample sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceReport {
    pub target_face: Face,
    /// True probability of the target face, in percent.
    pub theoretical_probability: f64,
    /// Sample size at each checkpoint.
    pub trials: Vec<usize>,
    /// Empirical hit rate at each checkpoint, in percent.
    pub empirical_probabilities: Vec<f64>,
    /// 95% Wald interval at each checkpoint, in percent.
    pub confidence_intervals: Vec<(f64, f64)>,
    pub final_empirical: f64,
    /// |final empirical - theoretical|, in percentage points.
    pub convergence_error: f64,
}

/// Aggregate risk statistics over a batch of paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub mean_final_balance: f64,
    pub std_final_balance: f64,
    pub mean_profit: f64,
    pub std_profit: f64,
    pub median_profit: f64,
    pub min_profit: f64,
    pub max_profit: f64,
    /// Profit at the 5th, 10th, 25th, 50th, 75th, 90th and 95th percentiles.
    pub profit_percentiles: Vec<(f64, f64)>,
    pub mean_win_rate: f64,
    /// Percent of paths that went bankrupt.
    pub ruin_probability: f64,
    /// Percent of paths stopped at [`BALANCE_CEILING`].
    pub ceiling_probability: f64,
    /// 5th percentile of profit.
    pub value_at_risk_5: f64,
}

/// Per-path scalars retained from a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDistribution {
    pub profits: Vec<f64>,
    pub final_balances: Vec<f64>,
    pub win_rates: Vec<f64>,
    pub histogram: Histogram,
}

/// Results from a batch of independent simulations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub num_simulations: usize,
    pub trials_per_simulation: usize,
    pub statistics: BatchStatistics,
    pub distribution: BatchDistribution,
}

/// Monte Carlo simulator for a wagering configuration.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    config: SimulationConfig,
    die: Die,
    sizer: BetSizer,
    win_probability: f64,
    kelly: KellyDecision,
}

impl MonteCarloSimulator {
    /// Creates a simulator, building the die from the configured weights.
    ///
    /// # Errors
    /// Returns `InvalidDistribution` for bad weights and `OutOfRange` for a
    /// target face outside 1..=6.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let die = Die::new(config.probabilities.as_deref())?;
        let win_probability = match config.target_face {
            Some(face) => die.probability_of(face)?,
            None => FAIR_PROBABILITY,
        };
        if !config.payout.is_finite() {
            return Err(RollQuestError::InvalidInput(
                "payout multiplier must be finite".to_string(),
            ));
        }

        let kelly = kelly(win_probability, config.payout);
        if config.strategy == BetStrategy::Kelly && !kelly.should_bet() {
            tracing::warn!(
                reason = kelly.reason.as_str(),
                expected_value = kelly.expected_value,
                "Kelly sizing finds no edge; no bets will be placed"
            );
        }
        let sizer = BetSizer::new(config.strategy, config.bet_amount, kelly.fraction);

        Ok(Self {
            config,
            die,
            sizer,
            win_probability,
            kelly,
        })
    }

    /// Returns a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Runs one path with the configured seed (or OS entropy).
    #[must_use]
    pub fn run(&self) -> SimulationResult {
        let mut rng = self.rng();
        self.run_with_rng(&mut rng)
    }

    /// Runs one path drawing from `rng`.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulationResult {
        self.simulate_path(rng, self.config.record_history)
    }

    fn simulate_path<R: Rng + ?Sized>(&self, rng: &mut R, record_history: bool) -> SimulationResult {
        let config = &self.config;
        let mut balance = config.starting_balance;
        let mut current_bet = config.bet_amount;
        let mut previous_won = None;

        let mut trajectory = Vec::with_capacity(config.num_trials.min(1_000_000) + 1);
        trajectory.push(balance);
        let mut history = Vec::new();
        let mut face_counts = [0u64; NUM_FACES];
        let (mut wins, mut losses) = (0u64, 0u64);
        let (mut max_balance, mut min_balance) = (balance, balance);
        let mut reached_balance_ceiling = false;

        for round in 1..=config.num_trials {
            if balance <= 0.0 {
                break;
            }
            if balance >= BALANCE_CEILING {
                reached_balance_ceiling = true;
                break;
            }
            let bet = self.sizer.next_bet(balance, previous_won, current_bet);
            if bet <= 0.0 {
                break;
            }

            let bet_face = match config.target_face {
                Some(face) => face,
                None => rng.gen_range(1..=6),
            };
            let rolled = self.die.sample(rng);
            let mut outcome =
                RoundOutcome::settle(round as u64, bet_face, bet, rolled, balance, config.payout);
            outcome.balance = outcome.balance.min(BALANCE_CEILING);

            face_counts[usize::from(rolled - 1)] += 1;
            if outcome.won {
                wins += 1;
            } else {
                losses += 1;
            }

            previous_won = Some(outcome.won);
            current_bet = bet;
            balance = outcome.balance;
            max_balance = max_balance.max(balance);
            min_balance = min_balance.min(balance);
            trajectory.push(balance);

            if record_history {
                history.push(outcome);
            }
        }

        let total_rounds = wins + losses;
        let win_rate = if total_rounds > 0 {
            wins as f64 / total_rounds as f64 * 100.0
        } else {
            0.0
        };
        let profit = balance - config.starting_balance;
        let profit_percentage = if config.starting_balance > 0.0 {
            profit / config.starting_balance * 100.0
        } else {
            0.0
        };

        let result = SimulationResult {
            summary: SimulationSummary {
                total_rounds,
                wins,
                losses,
                win_rate,
                final_balance: balance,
                profit,
                profit_percentage,
                max_balance,
                min_balance,
                went_bankrupt: balance <= 0.0,
                reached_balance_ceiling: reached_balance_ceiling || balance >= BALANCE_CEILING,
            },
            theoretical: self.theoretical(),
            face_distribution: FACES
                .iter()
                .copied()
                .zip(face_counts.iter().copied())
                .collect(),
            balance_trajectory: downsample(&trajectory, MAX_TRAJECTORY_POINTS),
            parameters: self.parameters(),
            history,
        };

        tracing::debug!(
            rounds = total_rounds,
            final_balance = balance,
            bankrupt = result.summary.went_bankrupt,
            strategy = %config.strategy,
            "simulation path complete"
        );

        result
    }

    /// Closed-form expectations for a single bet under this configuration.
    #[must_use]
    pub fn theoretical(&self) -> TheoreticalSummary {
        let p = self.win_probability;
        let payout = self.config.payout;
        TheoreticalSummary {
            expected_win_prob: p * 100.0,
            expected_value_per_bet: (p * payout - 1.0) * self.config.bet_amount,
            house_edge: (1.0 - p * payout) * 100.0,
            dice_expected_value: self.die.expected_value(),
            dice_variance: self.die.variance(),
            kelly: self.kelly,
        }
    }

    fn parameters(&self) -> SimulationParameters {
        let config = &self.config;
        SimulationParameters {
            num_trials: config.num_trials,
            starting_balance: config.starting_balance,
            bet_amount: config.bet_amount,
            bet_strategy: config.strategy,
            target_face: config.target_face,
            payout: config.payout,
            game_mode: self.die.mode(),
            probabilities: *self.die.probabilities(),
        }
    }

    /// Tracks how the empirical frequency of the target face approaches its
    /// true probability, using the configured seed.
    #[must_use]
    pub fn convergence_analysis(&self, checkpoints: usize) -> ConvergenceReport {
        let mut rng = self.rng();
        self.convergence_analysis_with_rng(checkpoints, &mut rng)
    }

    /// Convergence study drawing from `rng`.
    ///
    /// Draws `num_trials` rolls up front and records the running hit rate every
    /// `max(1, num_trials / checkpoints)` rolls, always including the last roll.
    pub fn convergence_analysis_with_rng<R: Rng + ?Sized>(
        &self,
        checkpoints: usize,
        rng: &mut R,
    ) -> ConvergenceReport {
        let target = self.config.target_face.unwrap_or(DEFAULT_CONVERGENCE_FACE);
        let theoretical = self.die.probabilities()[usize::from(target - 1)];

        let n = self.config.num_trials;
        let rolls = self.die.sample_n(n, rng);
        let step = (n / checkpoints.max(1)).max(1);

        let mut trials = Vec::new();
        let mut empirical = Vec::new();
        let mut intervals = Vec::new();
        let mut hits = 0usize;

        for (i, &face) in rolls.iter().enumerate() {
            if face == target {
                hits += 1;
            }
            let seen = i + 1;
            if seen % step == 0 || seen == n {
                let p = hits as f64 / seen as f64;
                let (lower, upper) = wald_ci(p, seen, Z_95);
                trials.push(seen);
                empirical.push(p * 100.0);
                intervals.push((lower * 100.0, upper * 100.0));
            }
        }

        let final_empirical = empirical.last().copied().unwrap_or(0.0);
        let convergence_error = if empirical.is_empty() {
            0.0
        } else {
            (final_empirical - theoretical * 100.0).abs()
        };

        tracing::info!(
            target_face = target,
            trials = n,
            checkpoints = trials.len(),
            convergence_error,
            "convergence analysis complete"
        );

        ConvergenceReport {
            target_face: target,
            theoretical_probability: theoretical * 100.0,
            trials,
            empirical_probabilities: empirical,
            confidence_intervals: intervals,
            final_empirical,
            convergence_error,
        }
    }

    /// Runs `num_simulations` independent paths and aggregates their outcomes.
    ///
    /// Paths run in parallel. Each path gets its own generator seeded from a
    /// master generator, so a seeded batch is reproducible regardless of how
    /// the paths are scheduled.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `num_simulations` is zero.
    pub fn batch_simulation(&self, num_simulations: usize) -> Result<BatchResult> {
        if num_simulations == 0 {
            return Err(RollQuestError::InvalidInput(
                "batch requires at least one simulation".to_string(),
            ));
        }

        let mut master = self.rng();
        let seeds: Vec<u64> = (0..num_simulations).map(|_| master.gen()).collect();

        let runs: Vec<SimulationSummary> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                self.simulate_path(&mut rng, false).summary
            })
            .collect();

        let profits: Vec<f64> = runs.iter().map(|r| r.profit).collect();
        let final_balances: Vec<f64> = runs.iter().map(|r| r.final_balance).collect();
        let win_rates: Vec<f64> = runs.iter().map(|r| r.win_rate).collect();
        let bankruptcies = runs.iter().filter(|r| r.went_bankrupt).count();
        let ceilings = runs.iter().filter(|r| r.reached_balance_ceiling).count();

        let profit_summary = DistributionSummary::from_values(&profits);
        let balance_summary = DistributionSummary::from_values(&final_balances);
        let value_at_risk_5 = profit_summary.percentile(0.05).unwrap_or(0.0);

        let statistics = BatchStatistics {
            mean_final_balance: balance_summary.mean,
            std_final_balance: balance_summary.std_dev,
            mean_profit: profit_summary.mean,
            std_profit: profit_summary.std_dev,
            median_profit: profit_summary.median,
            min_profit: profit_summary.min,
            max_profit: profit_summary.max,
            profit_percentiles: profit_summary.percentiles,
            mean_win_rate: win_rates.iter().sum::<f64>() / num_simulations as f64,
            ruin_probability: bankruptcies as f64 / num_simulations as f64 * 100.0,
            ceiling_probability: ceilings as f64 / num_simulations as f64 * 100.0,
            value_at_risk_5,
        };

        tracing::info!(
            simulations = num_simulations,
            trials = self.config.num_trials,
            mean_profit = statistics.mean_profit,
            ruin_probability = statistics.ruin_probability,
            "batch simulation complete"
        );

        let histogram = Histogram::from_values(&profits, HISTOGRAM_BINS);

        Ok(BatchResult {
            num_simulations,
            trials_per_simulation: self.config.num_trials,
            statistics,
            distribution: BatchDistribution {
                profits,
                final_balances,
                win_rates,
                histogram,
            },
        })
    }
}

/// Keeps every `⌊len / max_points⌋`-th point when `points` exceeds `max_points`,
/// always keeping the first and last point.
///
/// The step is an integer, so the output is not a hard cap: anything up to
/// `2 * max_points - 1` points still has step 1 and is returned whole.
#[must_use]
pub fn downsample(points: &[f64], max_points: usize) -> Vec<f64> {
    if max_points == 0 || points.len() <= max_points {
        return points.to_vec();
    }

    let step = points.len() / max_points;
    let mut sampled: Vec<f64> = points.iter().step_by(step).copied().collect();
    if (points.len() - 1) % step != 0 {
        if let Some(&last) = points.last() {
            sampled.push(last);
        }
    }
    sampled
}
