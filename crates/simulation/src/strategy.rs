//! Bet sizing strategies.

use std::fmt;
use std::str::FromStr;

use rollquest_core::RollQuestError;
use serde::{Deserialize, Serialize};

/// How the stake for the next round is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStrategy {
    /// Always stake the base bet.
    #[default]
    Fixed,
    /// Double after a loss, reset to the base bet after a win.
    Martingale,
    /// Double after a win, reset to the base bet after a loss.
    AntiMartingale,
    /// Stake the Kelly fraction of the current balance.
    Kelly,
}

impl BetStrategy {
    pub const ALL: [BetStrategy; 4] = [
        Self::Fixed,
        Self::Martingale,
        Self::AntiMartingale,
        Self::Kelly,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Martingale => "martingale",
            Self::AntiMartingale => "anti_martingale",
            Self::Kelly => "kelly",
        }
    }
}

impl fmt::Display for BetStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStrategy {
    type Err = RollQuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(Self::Fixed),
            "martingale" => Ok(Self::Martingale),
            "anti_martingale" | "antimartingale" => Ok(Self::AntiMartingale),
            "kelly" => Ok(Self::Kelly),
            _ => Err(RollQuestError::InvalidInput(format!(
                "unknown strategy '{s}'. Valid strategies: fixed, martingale, anti_martingale, kelly"
            ))),
        }
    }
}

/// A strategy bound to its base bet and Kelly fraction.
///
/// `next_bet` is a pure function of the balance, the previous round's outcome
/// (`None` before the first round) and the previous stake. Every result is
/// capped at the balance and floored at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetSizer {
    pub strategy: BetStrategy,
    pub base_bet: f64,
    /// Fraction of balance staked by [`BetStrategy::Kelly`].
    pub kelly_fraction: f64,
}

impl BetSizer {
    #[must_use]
    pub fn new(strategy: BetStrategy, base_bet: f64, kelly_fraction: f64) -> Self {
        Self {
            strategy,
            base_bet,
            kelly_fraction,
        }
    }

    #[must_use]
    pub fn next_bet(&self, balance: f64, previous_won: Option<bool>, current_bet: f64) -> f64 {
        let bet = match (self.strategy, previous_won) {
            (BetStrategy::Fixed, _) => self.base_bet,
            (BetStrategy::Martingale, Some(false)) => current_bet * 2.0,
            (BetStrategy::Martingale, _) => self.base_bet,
            (BetStrategy::AntiMartingale, Some(true)) => current_bet * 2.0,
            (BetStrategy::AntiMartingale, _) => self.base_bet,
            (BetStrategy::Kelly, _) => balance * self.kelly_fraction,
        };
        bet.min(balance).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_names() {
        for strategy in BetStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<BetStrategy>().unwrap(), strategy);
        }
        assert_eq!(
            "Anti-Martingale".parse::<BetStrategy>().unwrap(),
            BetStrategy::AntiMartingale
        );
        assert!(matches!(
            "dalembert".parse::<BetStrategy>(),
            Err(RollQuestError::InvalidInput(_))
        ));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&BetStrategy::AntiMartingale).unwrap();
        assert_eq!(json, "\"anti_martingale\"");
    }

    #[test]
    fn fixed_caps_at_balance() {
        let sizer = BetSizer::new(BetStrategy::Fixed, 10.0, 0.0);

        assert_eq!(sizer.next_bet(100.0, Some(false), 10.0), 10.0);
        assert_eq!(sizer.next_bet(4.0, Some(true), 10.0), 4.0);
    }

    #[test]
    fn martingale_doubles_after_loss_and_resets_after_win() {
        let sizer = BetSizer::new(BetStrategy::Martingale, 10.0, 0.0);

        assert_eq!(sizer.next_bet(1_000.0, None, 10.0), 10.0);
        assert_eq!(sizer.next_bet(1_000.0, Some(false), 10.0), 20.0);
        assert_eq!(sizer.next_bet(1_000.0, Some(false), 40.0), 80.0);
        assert_eq!(sizer.next_bet(1_000.0, Some(true), 80.0), 10.0);
        assert_eq!(sizer.next_bet(50.0, Some(false), 40.0), 50.0);
    }

    #[test]
    fn anti_martingale_doubles_after_win() {
        let sizer = BetSizer::new(BetStrategy::AntiMartingale, 10.0, 0.0);

        assert_eq!(sizer.next_bet(1_000.0, None, 10.0), 10.0);
        assert_eq!(sizer.next_bet(1_000.0, Some(true), 10.0), 20.0);
        assert_eq!(sizer.next_bet(1_000.0, Some(false), 20.0), 10.0);
        assert_eq!(sizer.next_bet(30.0, Some(true), 20.0), 30.0);
    }

    #[test]
    fn kelly_stakes_fraction_of_balance() {
        let sizer = BetSizer::new(BetStrategy::Kelly, 10.0, 0.1);

        assert!((sizer.next_bet(500.0, None, 10.0) - 50.0).abs() < 1e-12);

        let no_edge = BetSizer::new(BetStrategy::Kelly, 10.0, 0.0);
        assert_eq!(no_edge.next_bet(500.0, Some(true), 10.0), 0.0);
    }

    #[test]
    fn negative_balance_never_bets() {
        let sizer = BetSizer::new(BetStrategy::Fixed, 10.0, 0.0);
        assert_eq!(sizer.next_bet(-5.0, None, 10.0), 0.0);
    }
}
