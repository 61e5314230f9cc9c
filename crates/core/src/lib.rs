//! Core types for RollQuest: the weighted die, round records, Kelly sizing,
//! statistical primitives, the player session and configuration.

pub mod config;
pub mod config_loader;
pub mod dice;
pub mod error;
pub mod kelly;
pub mod outcome;
pub mod session;
pub mod validation;

pub use config::{AppConfig, GameConfig, SimulationLimits};
pub use config_loader::ConfigLoader;
pub use dice::{redistribute, DiceMode, Die, DieInfo, Face, FACES, FAIR_PROBABILITY, NUM_FACES};
pub use error::{Result, RollQuestError};
pub use kelly::{kelly, KellyDecision, KellyReason};
pub use outcome::{RoundOutcome, PAYOUT_MULTIPLIER};
pub use session::{GameSession, SessionStatistics};
pub use validation::{
    chi_square_critical, chi_square_sf, standard_normal_cdf, two_tailed_p_value, wald_ci, ALPHA_95,
    Z_95,
};
