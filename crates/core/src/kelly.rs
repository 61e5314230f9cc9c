//! Kelly Criterion sizing for fixed-odds single-face bets.
//!
//! A bet on one face pays `payout` times the stake on a win, so the net odds are
//! `b = payout - 1`. With win probability `p` and `q = 1 - p`:
//!
//! ```text
//! f* = (b·p - q) / b
//! ```
//!
//! Negative fractions mean the bet has no edge and are floored at zero. A payout
//! of 1 (b = 0) leaves the fraction undefined; it is treated as zero.

use serde::{Deserialize, Serialize};

/// Raw fractions smaller than this in magnitude count as no edge.
pub const KELLY_EPSILON: f64 = 1e-12;

/// Why a Kelly evaluation produced the fraction it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KellyReason {
    /// Positive edge, bet the Kelly fraction.
    PositiveEdge,
    /// Expected value is zero.
    NoEdge,
    /// Expected value is negative.
    NegativeEv,
    /// Payout of 1 or less, or probability outside [0, 1].
    InvalidInputs,
}

impl KellyReason {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PositiveEdge => "positive edge",
            Self::NoEdge => "no edge",
            Self::NegativeEv => "negative expected value",
            Self::InvalidInputs => "invalid inputs",
        }
    }
}

/// Result of evaluating the Kelly Criterion for one bet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KellyDecision {
    /// Fraction of bankroll to stake, in [0, 1].
    pub fraction: f64,
    /// Expected net return per unit staked: `p·payout - 1`.
    pub expected_value: f64,
    /// Reason for the decision.
    pub reason: KellyReason,
}

impl KellyDecision {
    /// Returns true if the decision calls for a non-zero stake.
    #[must_use]
    pub fn should_bet(&self) -> bool {
        self.fraction > 0.0
    }
}

/// Evaluates the Kelly Criterion for a bet with `win_prob` and gross `payout`.
///
/// # Examples
/// ```
/// use rollquest_core::kelly::{kelly, KellyReason};
///
/// // Fair die paying 6x: no edge.
/// let decision = kelly(1.0 / 6.0, 6.0);
/// assert_eq!(decision.fraction, 0.0);
///
/// // Face loaded to 25%: f* = (5 * 0.25 - 0.75) / 5 = 0.1
/// let decision = kelly(0.25, 6.0);
/// assert_eq!(decision.reason, KellyReason::PositiveEdge);
/// assert!((decision.fraction - 0.1).abs() < 1e-12);
/// ```
#[must_use]
pub fn kelly(win_prob: f64, payout: f64) -> KellyDecision {
    let b = payout - 1.0;
    if !(0.0..=1.0).contains(&win_prob) || !b.is_finite() || b <= 0.0 {
        return KellyDecision {
            fraction: 0.0,
            expected_value: 0.0,
            reason: KellyReason::InvalidInputs,
        };
    }

    let q = 1.0 - win_prob;
    let expected_value = win_prob * payout - 1.0;
    let raw = (b * win_prob - q) / b;

    if raw.abs() < KELLY_EPSILON {
        return KellyDecision {
            fraction: 0.0,
            expected_value: 0.0,
            reason: KellyReason::NoEdge,
        };
    }
    if raw < 0.0 {
        return KellyDecision {
            fraction: 0.0,
            expected_value,
            reason: KellyReason::NegativeEv,
        };
    }

    KellyDecision {
        fraction: raw.min(1.0),
        expected_value,
        reason: KellyReason::PositiveEdge,
    }
}
