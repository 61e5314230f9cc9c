//! Error type shared by the RollQuest crates.

use thiserror::Error;

/// Errors raised synchronously when a caller supplies invalid input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RollQuestError {
    /// Malformed probability vector (wrong length, negative entry, non-positive sum).
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A face or face index outside its permitted range.
    #[error("{what} {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// What was being indexed ("face", "face index").
        what: &'static str,
        /// The offending value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// Invalid arguments to a statistical test or game operation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RollQuestError {
    pub(crate) fn face(value: i64) -> Self {
        Self::OutOfRange {
            what: "face",
            value,
            min: 1,
            max: 6,
        }
    }

    pub(crate) fn face_index(value: i64) -> Self {
        Self::OutOfRange {
            what: "face index",
            value,
            min: 0,
            max: 5,
        }
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, RollQuestError>;
