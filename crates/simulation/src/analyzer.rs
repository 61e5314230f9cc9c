//! Statistical reports over round histories and simulation results.
//!
//! [`StatisticalAnalyzer`] borrows a slice of [`RoundOutcome`] records in the
//! order they were played. The hypothesis tests and the mode comparison do not
//! need a history and are associated functions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rollquest_core::{
    chi_square_critical, chi_square_sf, two_tailed_p_value, wald_ci, DiceMode, Face, Result,
    RollQuestError, RoundOutcome, ALPHA_95, FACES, FAIR_PROBABILITY, NUM_FACES,
    PAYOUT_MULTIPLIER, Z_95,
};

use crate::monte_carlo::SimulationResult;

/// Degrees of freedom of a goodness-of-fit test over six faces.
pub const DIE_DEGREES_OF_FREEDOM: usize = NUM_FACES - 1;

/// Number of most recent streaks kept by [`StatisticalAnalyzer::streak_analysis`].
pub const STREAK_HISTORY_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDistribution {
    pub counts: BTreeMap<Face, u64>,
    /// Share of rolls per face, in percent.
    pub percentages: BTreeMap<Face, f64>,
    pub total_rolls: u64,
    /// Fair-die reference share, in percent.
    pub expected_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitSeries {
    pub rounds: Vec<u64>,
    pub balances: Vec<f64>,
}

/// Win/loss streaks. Positive values are winning runs, negative losing runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakReport {
    pub current_streak: i64,
    pub max_win_streak: u64,
    pub max_lose_streak: u64,
    /// Most recent streaks, oldest first, ending with the current one.
    pub streak_history: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacePerformance {
    pub times_bet: u64,
    pub wins: u64,
    /// Percent of bets on this face that won.
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetReport {
    pub total_wagered: f64,
    /// Gross return of winning bets (stake times the payout multiplier).
    pub total_won: f64,
    /// `total_wagered - total_won`; negative when the player is ahead.
    pub total_lost: f64,
    pub avg_bet: f64,
    /// Only faces that were bet on at least once.
    pub bet_face_performance: BTreeMap<Face, FacePerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareReport {
    pub chi_square_statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
    pub critical_value_95: f64,
    pub is_fair: bool,
    pub interpretation: String,
    pub observed: Vec<u64>,
    /// Expected count per face.
    pub expected: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZTestReport {
    pub observed_wins: u64,
    pub total_trials: u64,
    pub observed_proportion: f64,
    pub expected_proportion: f64,
    pub z_score: f64,
    pub p_value: f64,
    /// 95% Wald interval around the observed proportion.
    pub confidence_interval_95: (f64, f64),
    pub is_significant: bool,
    pub interpretation: String,
}

/// Which side of a comparison came out ahead on a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    First,
    Second,
    Equal,
}

impl Advantage {
    fn of(difference: f64) -> Self {
        if difference > 0.0 {
            Self::First
        } else if difference < 0.0 {
            Self::Second
        } else {
            Self::Equal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: String,
    pub first: f64,
    pub second: f64,
    /// `first - second`.
    pub difference: f64,
    pub better: Advantage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeComparison {
    pub first_mode: DiceMode,
    pub second_mode: DiceMode,
    pub metrics: Vec<MetricComparison>,
    pub overall: Advantage,
    pub conclusion: String,
}

/// Read-only analysis over a round history.
#[derive(Debug, Clone, Copy)]
pub struct StatisticalAnalyzer<'a> {
    history: &'a [RoundOutcome],
}

impl<'a> StatisticalAnalyzer<'a> {
    #[must_use]
    pub fn new(history: &'a [RoundOutcome]) -> Self {
        Self { history }
    }

    /// Counts and percentages of the rolled faces.
    #[must_use]
    pub fn face_distribution(&self) -> FaceDistribution {
        let mut counts = [0u64; NUM_FACES];
        for outcome in self.history {
            if let Some(slot) = counts.get_mut(usize::from(outcome.result).wrapping_sub(1)) {
                *slot += 1;
            }
        }

        let total: u64 = counts.iter().sum();
        let percentage = |count: u64| {
            if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            }
        };

        FaceDistribution {
            counts: FACES.iter().copied().zip(counts.iter().copied()).collect(),
            percentages: FACES
                .iter()
                .copied()
                .zip(counts.iter().map(|&c| percentage(c)))
                .collect(),
            total_rolls: total,
            expected_percentage: FAIR_PROBABILITY * 100.0,
        }
    }

    #[must_use]
    pub fn profit_over_time(&self) -> ProfitSeries {
        ProfitSeries {
            rounds: self.history.iter().map(|o| o.round).collect(),
            balances: self.history.iter().map(|o| o.balance).collect(),
        }
    }

    #[must_use]
    pub fn streak_analysis(&self) -> StreakReport {
        let mut streaks = Vec::new();
        let mut current: i64 = 0;
        let (mut max_win, mut max_lose) = (0u64, 0u64);

        for outcome in self.history {
            if outcome.won {
                if current <= 0 {
                    if current != 0 {
                        streaks.push(current);
                    }
                    current = 0;
                }
                current += 1;
                max_win = max_win.max(current.unsigned_abs());
            } else {
                if current >= 0 {
                    if current != 0 {
                        streaks.push(current);
                    }
                    current = 0;
                }
                current -= 1;
                max_lose = max_lose.max(current.unsigned_abs());
            }
        }
        if current != 0 {
            streaks.push(current);
        }

        let keep_from = streaks.len().saturating_sub(STREAK_HISTORY_LEN);
        StreakReport {
            current_streak: current,
            max_win_streak: max_win,
            max_lose_streak: max_lose,
            streak_history: streaks.split_off(keep_from),
        }
    }

    /// Stakes, returns and per-face hit rates, at the default payout.
    #[must_use]
    pub fn bet_analysis(&self) -> BetReport {
        let mut total_wagered = 0.0;
        let mut total_won = 0.0;
        let mut per_face = [(0u64, 0u64); NUM_FACES];

        for outcome in self.history {
            total_wagered += outcome.bet_amount;
            if outcome.won {
                total_won += outcome.bet_amount * PAYOUT_MULTIPLIER;
            }
            if let Some((bets, wins)) =
                per_face.get_mut(usize::from(outcome.bet_face).wrapping_sub(1))
            {
                *bets += 1;
                if outcome.won {
                    *wins += 1;
                }
            }
        }

        let bet_face_performance = FACES
            .iter()
            .zip(per_face.iter())
            .filter(|(_, (bets, _))| *bets > 0)
            .map(|(&face, &(bets, wins))| {
                (
                    face,
                    FacePerformance {
                        times_bet: bets,
                        wins,
                        win_rate: wins as f64 / bets as f64 * 100.0,
                    },
                )
            })
            .collect();

        let avg_bet = if self.history.is_empty() {
            0.0
        } else {
            total_wagered / self.history.len() as f64
        };

        BetReport {
            total_wagered,
            total_won,
            total_lost: total_wagered - total_won,
            avg_bet,
            bet_face_performance,
        }
    }

    /// Pearson goodness-of-fit test of per-face counts.
    ///
    /// `expected_probs` defaults to a fair die and is normalized before use.
    /// The die is judged fair when the p-value exceeds 0.05.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `observed` has six entries with a positive
    /// total, or if `expected_probs` does not have six positive finite entries.
    pub fn chi_square_test(
        observed: &[u64],
        expected_probs: Option<&[f64]>,
    ) -> Result<ChiSquareReport> {
        if observed.len() != NUM_FACES {
            return Err(RollQuestError::InvalidInput(format!(
                "observed must have {NUM_FACES} counts, got {}",
                observed.len()
            )));
        }
        let total: u64 = observed.iter().sum();
        if total == 0 {
            return Err(RollQuestError::InvalidInput("no observations".to_string()));
        }

        let probs: Vec<f64> = match expected_probs {
            None => vec![FAIR_PROBABILITY; NUM_FACES],
            Some(p) => {
                if p.len() != NUM_FACES || p.iter().any(|&x| !(x.is_finite() && x > 0.0)) {
                    return Err(RollQuestError::InvalidInput(format!(
                        "expected probabilities must be {NUM_FACES} positive values"
                    )));
                }
                let sum: f64 = p.iter().sum();
                p.iter().map(|x| x / sum).collect()
            }
        };

        let expected: Vec<f64> = probs.iter().map(|p| total as f64 * p).collect();
        let statistic: f64 = observed
            .iter()
            .zip(&expected)
            .map(|(&o, &e)| (o as f64 - e).powi(2) / e)
            .sum();

        let p_value = chi_square_sf(statistic, DIE_DEGREES_OF_FREEDOM);
        let is_fair = p_value > ALPHA_95;
        let interpretation = if is_fair {
            "The die appears to be FAIR (cannot reject the null hypothesis)."
        } else {
            "The die appears to be BIASED (null hypothesis rejected at 95% confidence)."
        };

        Ok(ChiSquareReport {
            chi_square_statistic: statistic,
            p_value,
            degrees_of_freedom: DIE_DEGREES_OF_FREEDOM,
            critical_value_95: chi_square_critical(ALPHA_95, DIE_DEGREES_OF_FREEDOM),
            is_fair,
            interpretation: interpretation.to_string(),
            observed: observed.to_vec(),
            expected,
        })
    }

    /// Two-tailed z-test of an observed win proportion against `expected_prob`.
    ///
    /// # Errors
    /// Returns `InvalidInput` if `trials` is zero, `wins > trials` or
    /// `expected_prob` is outside [0, 1].
    pub fn z_test_proportion(wins: u64, trials: u64, expected_prob: f64) -> Result<ZTestReport> {
        if trials == 0 {
            return Err(RollQuestError::InvalidInput("no trials".to_string()));
        }
        if wins > trials {
            return Err(RollQuestError::InvalidInput(format!(
                "wins ({wins}) cannot exceed trials ({trials})"
            )));
        }
        if !(0.0..=1.0).contains(&expected_prob) {
            return Err(RollQuestError::InvalidInput(format!(
                "expected probability must be in [0, 1], got {expected_prob}"
            )));
        }

        let n = trials as f64;
        let observed = wins as f64 / n;
        let se = (expected_prob * (1.0 - expected_prob) / n).sqrt();
        let z = if se > 0.0 {
            (observed - expected_prob) / se
        } else {
            0.0
        };
        let p_value = two_tailed_p_value(z);
        let is_significant = p_value < ALPHA_95;
        let interpretation = if is_significant {
            "The observed win rate is SIGNIFICANTLY DIFFERENT from expected."
        } else {
            "The observed win rate is NOT significantly different from expected."
        };

        Ok(ZTestReport {
            observed_wins: wins,
            total_trials: trials,
            observed_proportion: observed,
            expected_proportion: expected_prob,
            z_score: z,
            p_value,
            confidence_interval_95: wald_ci(observed, trials as usize, Z_95),
            is_significant,
            interpretation: interpretation.to_string(),
        })
    }

    /// Compares two simulation results metric by metric. Larger is better on
    /// every metric; the overall winner is whichever side wins more metrics.
    #[must_use]
    pub fn compare_modes(first: &SimulationResult, second: &SimulationResult) -> ModeComparison {
        let (a, b) = (&first.summary, &second.summary);
        let rows = [
            ("Win Rate (%)", a.win_rate, b.win_rate),
            ("Final Balance", a.final_balance, b.final_balance),
            ("Profit", a.profit, b.profit),
            ("Max Balance", a.max_balance, b.max_balance),
        ];

        let metrics: Vec<MetricComparison> = rows
            .iter()
            .map(|&(metric, first, second)| {
                let difference = first - second;
                MetricComparison {
                    metric: metric.to_string(),
                    first,
                    second,
                    difference,
                    better: Advantage::of(difference),
                }
            })
            .collect();

        let first_wins = metrics.iter().filter(|m| m.better == Advantage::First).count();
        let second_wins = metrics.iter().filter(|m| m.better == Advantage::Second).count();
        let overall = Advantage::of(first_wins as f64 - second_wins as f64);

        let first_mode = first.parameters.game_mode;
        let second_mode = second.parameters.game_mode;
        let conclusion = match overall {
            Advantage::First => format!("{} game mode performed better overall.", title(first_mode)),
            Advantage::Second => {
                format!("{} game mode performed better overall.", title(second_mode))
            }
            Advantage::Equal => "Both modes performed similarly.".to_string(),
        };

        ModeComparison {
            first_mode,
            second_mode,
            metrics,
            overall,
            conclusion,
        }
    }
}

fn title(mode: DiceMode) -> &'static str {
    match mode {
        DiceMode::Fair => "Fair",
        DiceMode::Tweaked => "Tweaked",
    }
}
