//! Per-round wager record shared by the simulator, the game session and the analyzer.

use serde::{Deserialize, Serialize};

use crate::dice::Face;

/// Default payout multiplier: a winning bet returns six times the stake.
pub const PAYOUT_MULTIPLIER: f64 = 6.0;

/// One resolved round of betting on a single face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    /// 1-based round index.
    pub round: u64,
    /// Face the bettor picked.
    pub bet_face: Face,
    /// Stake for this round.
    pub bet_amount: f64,
    /// Face that came up.
    pub result: Face,
    /// Whether `result == bet_face`.
    pub won: bool,
    /// Balance after the round settled.
    pub balance: f64,
}

impl RoundOutcome {
    /// Resolves a round: the bet wins iff the rolled face matches the bet face.
    ///
    /// A win adds `bet_amount * (payout - 1)` to `balance_before`, a loss subtracts
    /// the stake.
    #[must_use]
    pub fn settle(
        round: u64,
        bet_face: Face,
        bet_amount: f64,
        result: Face,
        balance_before: f64,
        payout: f64,
    ) -> Self {
        let won = result == bet_face;
        let balance = if won {
            balance_before + bet_amount * (payout - 1.0)
        } else {
            balance_before - bet_amount
        };

        Self {
            round,
            bet_face,
            bet_amount,
            result,
            won,
            balance,
        }
    }

    /// Net change in balance caused by this round.
    #[must_use]
    pub fn net(&self, payout: f64) -> f64 {
        if self.won {
            self.bet_amount * (payout - 1.0)
        } else {
            -self.bet_amount
        }
    }
}
