//! Player session for interactive play.
//!
//! [`GameSession`] is a plain value: every operation returns the updated
//! session, so callers decide where (and whether) it is stored. A rejected
//! round borrows the session and leaves it untouched.
//! The round history is append-only and bounded to the most recent
//! `history_limit` rounds.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::dice::{Die, Face, FACES, NUM_FACES};
use crate::error::{Result, RollQuestError};
use crate::outcome::RoundOutcome;

/// Balance, counters and recent history for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub player_name: String,
    pub initial_balance: f64,
    pub balance: f64,
    pub profit: f64,
    pub total_rounds: u64,
    pub wins: u64,
    pub losses: u64,
    /// Most recent rounds, oldest first.
    pub history: Vec<RoundOutcome>,
    /// Rolled-face counts over the whole session, not just the retained history.
    pub face_counts: [u64; NUM_FACES],
    /// Positive for a run of wins, negative for a run of losses.
    pub current_streak: i64,
    pub max_win_streak: u64,
    pub max_lose_streak: u64,
    pub started_at: DateTime<Utc>,
}

/// Summary view of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub player_name: String,
    pub balance: f64,
    pub initial_balance: f64,
    pub profit: f64,
    pub profit_percentage: f64,
    pub total_rounds: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: f64,
    pub face_distribution: BTreeMap<Face, u64>,
    pub current_streak: i64,
    pub max_win_streak: u64,
    pub max_lose_streak: u64,
}

impl GameSession {
    /// Starts a session with the given balance.
    #[must_use]
    pub fn new(player_name: impl Into<String>, initial_balance: f64) -> Self {
        Self {
            player_name: player_name.into(),
            initial_balance,
            balance: initial_balance,
            profit: 0.0,
            total_rounds: 0,
            wins: 0,
            losses: 0,
            history: Vec::new(),
            face_counts: [0; NUM_FACES],
            current_streak: 0,
            max_win_streak: 0,
            max_lose_streak: 0,
            started_at: Utc::now(),
        }
    }

    /// Starts a session with the configured default balance.
    #[must_use]
    pub fn from_config(player_name: impl Into<String>, config: &GameConfig) -> Self {
        Self::new(player_name, config.default_balance)
    }

    /// Win rate in percent, 0 before the first round.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.total_rounds == 0 {
            return 0.0;
        }
        self.wins as f64 / self.total_rounds as f64 * 100.0
    }

    /// Places a bet on `bet_face`, rolls `die` and settles the round, returning
    /// the session after the round.
    ///
    /// # Errors
    /// Returns `OutOfRange` for a face outside 1..=6, and `InvalidInput` if the
    /// stake is outside the table limits or exceeds the balance.
    pub fn play_round<R: Rng + ?Sized>(
        &self,
        die: &Die,
        bet_face: Face,
        bet_amount: f64,
        config: &GameConfig,
        rng: &mut R,
    ) -> Result<(Self, RoundOutcome)> {
        if !(1..=6).contains(&bet_face) {
            return Err(RollQuestError::face(i64::from(bet_face)));
        }
        if !(config.min_bet..=config.max_bet).contains(&bet_amount) {
            return Err(RollQuestError::InvalidInput(format!(
                "bet must be between {} and {}",
                config.min_bet, config.max_bet
            )));
        }
        if bet_amount > self.balance {
            return Err(RollQuestError::InvalidInput(
                "insufficient balance".to_string(),
            ));
        }

        let result = die.sample(rng);
        let outcome = RoundOutcome::settle(
            self.total_rounds + 1,
            bet_face,
            bet_amount,
            result,
            self.balance,
            config.payout_multiplier,
        );

        let session = self.clone().record(&outcome, config);
        Ok((session, outcome))
    }

    /// Adds funds to the balance.
    ///
    /// # Errors
    /// Returns `InvalidInput` unless `0 < amount <= max_funds_add`.
    pub fn add_funds(mut self, amount: f64, config: &GameConfig) -> Result<Self> {
        if !(amount > 0.0 && amount <= config.max_funds_add) {
            return Err(RollQuestError::InvalidInput(format!(
                "amount must be positive and at most {}",
                config.max_funds_add
            )));
        }
        self.balance += amount;
        Ok(self)
    }

    /// Renames the player, truncating to the configured length.
    #[must_use]
    pub fn with_player_name(mut self, name: &str, config: &GameConfig) -> Self {
        self.player_name = name.chars().take(config.max_player_name_len).collect();
        self
    }

    /// Returns a fresh session with the same player and initial balance.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::new(self.player_name, self.initial_balance)
    }

    #[must_use]
    pub fn statistics(&self) -> SessionStatistics {
        let profit_percentage = if self.initial_balance > 0.0 {
            self.profit / self.initial_balance * 100.0
        } else {
            0.0
        };

        SessionStatistics {
            player_name: self.player_name.clone(),
            balance: self.balance,
            initial_balance: self.initial_balance,
            profit: self.profit,
            profit_percentage,
            total_rounds: self.total_rounds,
            wins: self.wins,
            losses: self.losses,
            win_rate: self.win_rate(),
            face_distribution: FACES
                .iter()
                .copied()
                .zip(self.face_counts.iter().copied())
                .collect(),
            current_streak: self.current_streak,
            max_win_streak: self.max_win_streak,
            max_lose_streak: self.max_lose_streak,
        }
    }

    fn record(mut self, outcome: &RoundOutcome, config: &GameConfig) -> Self {
        self.balance = outcome.balance;
        self.profit += outcome.net(config.payout_multiplier);
        self.total_rounds += 1;
        self.face_counts[usize::from(outcome.result - 1)] += 1;

        if outcome.won {
            self.wins += 1;
            self.current_streak = self.current_streak.max(0) + 1;
            self.max_win_streak = self.max_win_streak.max(self.current_streak.unsigned_abs());
        } else {
            self.losses += 1;
            self.current_streak = self.current_streak.min(0) - 1;
            self.max_lose_streak = self.max_lose_streak.max(self.current_streak.unsigned_abs());
        }

        self.history.push(outcome.clone());
        if self.history.len() > config.history_limit {
            let excess = self.history.len() - config.history_limit;
            self.history.drain(..excess);
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn loaded_die(face: usize) -> Die {
        let mut weights = [0.0; NUM_FACES];
        weights[face - 1] = 1.0;
        Die::new(Some(&weights)).unwrap()
    }

    #[test]
    fn winning_round_pays_out() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let session = GameSession::new("Ada", 100.0);

        let (session, outcome) = session
            .play_round(&loaded_die(3), 3, 10.0, &config, &mut rng)
            .unwrap();

        assert!(outcome.won);
        assert_eq!(outcome.round, 1);
        assert!((session.balance - 150.0).abs() < 1e-12);
        assert!((session.profit - 50.0).abs() < 1e-12);
        assert_eq!(session.wins, 1);
        assert_eq!(session.current_streak, 1);
        assert_eq!(session.face_counts[2], 1);
    }

    #[test]
    fn losing_rounds_build_negative_streak() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let die = loaded_die(1);
        let mut session = GameSession::new("Ada", 100.0);

        for _ in 0..3 {
            session = session.play_round(&die, 6, 10.0, &config, &mut rng).unwrap().0;
        }

        assert_eq!(session.losses, 3);
        assert_eq!(session.current_streak, -3);
        assert_eq!(session.max_lose_streak, 3);
        assert!((session.balance - 70.0).abs() < 1e-12);
        assert!((session.profit + 30.0).abs() < 1e-12);
        assert_eq!(session.win_rate(), 0.0);
    }

    #[test]
    fn rejects_invalid_bets() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let die = Die::fair();

        let err = GameSession::new("Ada", 100.0)
            .play_round(&die, 7, 10.0, &config, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RollQuestError::OutOfRange { .. }));

        let err = GameSession::new("Ada", 100.0)
            .play_round(&die, 2, 0.5, &config, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RollQuestError::InvalidInput(_)));

        let err = GameSession::new("Ada", 5.0)
            .play_round(&die, 2, 10.0, &config, &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            RollQuestError::InvalidInput("insufficient balance".to_string())
        );
    }

    #[test]
    fn rejected_bet_keeps_session() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let die = loaded_die(2);
        let (session, _) = GameSession::new("Ada", 100.0)
            .play_round(&die, 2, 10.0, &config, &mut rng)
            .unwrap();
        let before = session.clone();

        assert!(session.play_round(&die, 2, 0.5, &config, &mut rng).is_err());
        assert!(session.play_round(&die, 9, 10.0, &config, &mut rng).is_err());
        assert!(session.play_round(&die, 2, 500.0, &config, &mut rng).is_err());
        assert_eq!(session, before);

        let (session, outcome) = session
            .play_round(&die, 2, 10.0, &config, &mut rng)
            .unwrap();
        assert_eq!(outcome.round, 2);
        assert_eq!(session.total_rounds, 2);
        assert!((session.balance - 200.0).abs() < 1e-12);
        assert!((session.profit - 100.0).abs() < 1e-12);
    }

    #[test]
    fn history_is_bounded() {
        let config = GameConfig {
            history_limit: 5,
            ..GameConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let die = loaded_die(2);
        let mut session = GameSession::new("Ada", 1_000.0);

        for _ in 0..8 {
            session = session.play_round(&die, 2, 1.0, &config, &mut rng).unwrap().0;
        }

        assert_eq!(session.total_rounds, 8);
        assert_eq!(session.history.len(), 5);
        assert_eq!(session.history[0].round, 4);
        assert_eq!(session.history[4].round, 8);
        assert_eq!(session.face_counts[1], 8);
    }

    #[test]
    fn add_funds_respects_limit() {
        let config = GameConfig::default();
        let session = GameSession::new("Ada", 100.0);

        let session = session.add_funds(50.0, &config).unwrap();
        assert!((session.balance - 150.0).abs() < 1e-12);

        assert!(session.clone().add_funds(0.0, &config).is_err());
        assert!(session.add_funds(200_000.0, &config).is_err());
    }

    #[test]
    fn player_name_is_truncated() {
        let config = GameConfig::default();
        let session =
            GameSession::new("x", 100.0).with_player_name("a-very-long-player-name-indeed", &config);

        assert_eq!(session.player_name.chars().count(), 20);
    }

    #[test]
    fn reset_restores_initial_state() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let (session, _) = GameSession::new("Ada", 100.0)
            .play_round(&loaded_die(4), 4, 10.0, &config, &mut rng)
            .unwrap();

        let session = session.reset();
        assert_eq!(session.balance, 100.0);
        assert_eq!(session.total_rounds, 0);
        assert!(session.history.is_empty());
        assert_eq!(session.player_name, "Ada");
    }

    #[test]
    fn statistics_report_percentages() {
        let config = GameConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let (session, _) = GameSession::new("Ada", 200.0)
            .play_round(&loaded_die(5), 5, 20.0, &config, &mut rng)
            .unwrap();

        let stats = session.statistics();
        assert_eq!(stats.win_rate, 100.0);
        assert!((stats.profit_percentage - 50.0).abs() < 1e-12);
        assert_eq!(stats.face_distribution[&5], 1);
    }
}
