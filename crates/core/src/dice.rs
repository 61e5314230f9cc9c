//! Six-sided die with fair and tweaked probability modes.
//!
//! A [`Die`] is built either as a fair die (1/6 per face) or from an arbitrary
//! six-element weight vector, which is normalized at construction so every
//! downstream statistic works on a valid distribution without re-checking it.
//!
//! # Example
//!
//! ```
//! use rollquest_core::dice::Die;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let die = Die::new(Some(&[2.0, 1.0, 1.0, 1.0, 1.0, 1.0])).unwrap();
//! assert!((die.probability_of(1).unwrap() - 2.0 / 7.0).abs() < 1e-12);
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let face = die.sample(&mut rng);
//! assert!((1..=6).contains(&face));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RollQuestError};

/// A die face, 1 through 6.
pub type Face = u8;

/// Number of faces on the die.
pub const NUM_FACES: usize = 6;

/// All faces in order.
pub const FACES: [Face; NUM_FACES] = [1, 2, 3, 4, 5, 6];

/// Probability of any single face on a fair die.
pub const FAIR_PROBABILITY: f64 = 1.0 / 6.0;

/// Whether the die uses the uniform distribution or a custom one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceMode {
    /// Uniform 1/6 per face.
    Fair,
    /// Arbitrary normalized distribution.
    Tweaked,
}

impl fmt::Display for DiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fair => write!(f, "fair"),
            Self::Tweaked => write!(f, "tweaked"),
        }
    }
}

#[derive(Debug, Clone)]
enum Sampler {
    Uniform,
    Weighted(WeightedIndex<f64>),
}

/// A weighted six-sided die.
#[derive(Debug, Clone)]
pub struct Die {
    probabilities: [f64; NUM_FACES],
    mode: DiceMode,
    sampler: Sampler,
}

/// Serializable snapshot of a die and its closed-form statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DieInfo {
    /// Fair or tweaked.
    pub mode: DiceMode,
    /// Probability per face.
    pub probabilities: BTreeMap<Face, f64>,
    /// E[X].
    pub expected_value: f64,
    /// Var(X).
    pub variance: f64,
    /// Standard deviation.
    pub std_dev: f64,
}

impl Default for Die {
    fn default() -> Self {
        Self::fair()
    }
}

impl Die {
    /// Creates a fair die.
    #[must_use]
    pub fn fair() -> Self {
        Self {
            probabilities: [FAIR_PROBABILITY; NUM_FACES],
            mode: DiceMode::Fair,
            sampler: Sampler::Uniform,
        }
    }

    /// Creates a die from optional raw weights.
    ///
    /// `None` yields a fair die. Weights are divided by their sum, so
    /// `[2, 1, 1, 1, 1, 1]` and `[0.4, 0.2, 0.2, 0.2, 0.2, 0.2]` build the same die.
    ///
    /// # Errors
    /// Returns `InvalidDistribution` if there are not exactly 6 weights, any
    /// weight is negative or non-finite, or the weights sum to zero or less.
    pub fn new(weights: Option<&[f64]>) -> Result<Self> {
        let Some(weights) = weights else {
            return Ok(Self::fair());
        };

        if weights.len() != NUM_FACES {
            return Err(RollQuestError::InvalidDistribution(format!(
                "expected {NUM_FACES} weights, got {}",
                weights.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(RollQuestError::InvalidDistribution(format!(
                "weights must be finite and non-negative, got {bad}"
            )));
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(RollQuestError::InvalidDistribution(
                "weights must sum to a positive value".to_string(),
            ));
        }

        let mut probabilities = [0.0; NUM_FACES];
        for (p, w) in probabilities.iter_mut().zip(weights) {
            *p = w / total;
        }

        let sampler = WeightedIndex::new(probabilities)
            .map_err(|e| RollQuestError::InvalidDistribution(e.to_string()))?;

        Ok(Self {
            probabilities,
            mode: DiceMode::Tweaked,
            sampler: Sampler::Weighted(sampler),
        })
    }

    /// Normalized probabilities for faces 1 through 6.
    #[must_use]
    pub fn probabilities(&self) -> &[f64; NUM_FACES] {
        &self.probabilities
    }

    /// Fair or tweaked.
    #[must_use]
    pub fn mode(&self) -> DiceMode {
        self.mode
    }

    /// Rolls the die once.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Face {
        match &self.sampler {
            Sampler::Uniform => rng.gen_range(1..=6),
            Sampler::Weighted(index) => FACES[index.sample(rng)],
        }
    }

    /// Rolls the die `n` times.
    pub fn sample_n<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Face> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// E[X] = Σ face · p(face).
    #[must_use]
    pub fn expected_value(&self) -> f64 {
        FACES
            .iter()
            .zip(self.probabilities.iter())
            .map(|(&face, &p)| f64::from(face) * p)
            .sum()
    }

    /// Var(X) = Σ p(face) · (face − E)².
    #[must_use]
    pub fn variance(&self) -> f64 {
        let ev = self.expected_value();
        FACES
            .iter()
            .zip(self.probabilities.iter())
            .map(|(&face, &p)| p * (f64::from(face) - ev).powi(2))
            .sum()
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Probability of rolling `face`.
    ///
    /// # Errors
    /// Returns `OutOfRange` unless `face` is in 1..=6.
    pub fn probability_of(&self, face: Face) -> Result<f64> {
        if !(1..=6).contains(&face) {
            return Err(RollQuestError::face(i64::from(face)));
        }
        Ok(self.probabilities[usize::from(face - 1)])
    }

    /// Full probability information for display or serialization.
    #[must_use]
    pub fn probability_info(&self) -> DieInfo {
        DieInfo {
            mode: self.mode,
            probabilities: FACES
                .iter()
                .copied()
                .zip(self.probabilities.iter().copied())
                .collect(),
            expected_value: self.expected_value(),
            variance: self.variance(),
            std_dev: self.std_dev(),
        }
    }
}

/// Sets one face's probability and rescales the others so all six sum to 1.
///
/// `new_value` is clamped to [0, 1] (NaN counts as 0). The remaining mass
/// `1 − new_value` is shared among the other faces in proportion to their
/// current probabilities; if they are all zero it is split equally.
///
/// # Errors
/// Returns `OutOfRange` if `face_index` is not in 0..=5.
pub fn redistribute(
    current: &[f64; NUM_FACES],
    face_index: usize,
    new_value: f64,
) -> Result<[f64; NUM_FACES]> {
    if face_index >= NUM_FACES {
        return Err(RollQuestError::face_index(
            i64::try_from(face_index).unwrap_or(i64::MAX),
        ));
    }

    let new_value = if new_value.is_nan() {
        0.0
    } else {
        new_value.clamp(0.0, 1.0)
    };
    let remaining = 1.0 - new_value;
    let other_total: f64 = current
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != face_index)
        .map(|(_, p)| *p)
        .sum();

    let mut adjusted = [0.0; NUM_FACES];
    for (i, slot) in adjusted.iter_mut().enumerate() {
        *slot = if i == face_index {
            new_value
        } else if other_total > 0.0 {
            current[i] / other_total * remaining
        } else {
            remaining / (NUM_FACES - 1) as f64
        };
    }

    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    // ============================================================
    // Construction Tests
    // ============================================================

    #[test]
    fn new_without_weights_is_fair() {
        let die = Die::new(None).unwrap();

        assert_eq!(die.mode(), DiceMode::Fair);
        for p in die.probabilities() {
            assert!((p - FAIR_PROBABILITY).abs() < 1e-12);
        }
    }

    #[test]
    fn new_normalizes_weights() {
        let die = Die::new(Some(&[3.0, 1.0, 1.0, 1.0, 1.0, 3.0])).unwrap();

        assert_eq!(die.mode(), DiceMode::Tweaked);
        assert!((die.probability_of(1).unwrap() - 0.3).abs() < 1e-12);
        assert!((die.probability_of(2).unwrap() - 0.1).abs() < 1e-12);
        assert!((die.probability_of(6).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn new_rejects_wrong_length() {
        let err = Die::new(Some(&[1.0; 5])).unwrap_err();
        assert!(matches!(err, RollQuestError::InvalidDistribution(_)));

        let err = Die::new(Some(&[1.0; 7])).unwrap_err();
        assert!(matches!(err, RollQuestError::InvalidDistribution(_)));
    }

    #[test]
    fn new_rejects_zero_sum() {
        let err = Die::new(Some(&[0.0; 6])).unwrap_err();
        assert!(matches!(err, RollQuestError::InvalidDistribution(_)));
    }

    #[test]
    fn new_rejects_negative_and_nan_weights() {
        let err = Die::new(Some(&[1.0, -0.5, 1.0, 1.0, 1.0, 1.0])).unwrap_err();
        assert!(matches!(err, RollQuestError::InvalidDistribution(_)));

        let err = Die::new(Some(&[1.0, f64::NAN, 1.0, 1.0, 1.0, 1.0])).unwrap_err();
        assert!(matches!(err, RollQuestError::InvalidDistribution(_)));
    }

    // ============================================================
    // Statistics Tests
    // ============================================================

    #[test]
    fn fair_die_moments() {
        let die = Die::fair();

        assert!((die.expected_value() - 3.5).abs() < 1e-12);
        assert!((die.variance() - 35.0 / 12.0).abs() < 1e-12);
        assert!((die.variance() - 2.9167).abs() < 1e-4);
        assert!((die.std_dev() - (35.0_f64 / 12.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn loaded_die_moments() {
        let die = Die::new(Some(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0])).unwrap();

        assert!((die.expected_value() - 6.0).abs() < 1e-12);
        assert!(die.variance().abs() < 1e-12);
    }

    #[test]
    fn probability_of_rejects_bad_faces() {
        let die = Die::fair();

        assert_eq!(die.probability_of(0).unwrap_err(), RollQuestError::face(0));
        assert_eq!(die.probability_of(7).unwrap_err(), RollQuestError::face(7));
    }

    #[test]
    fn probability_info_reports_all_faces() {
        let info = Die::fair().probability_info();

        assert_eq!(info.mode, DiceMode::Fair);
        assert_eq!(info.probabilities.len(), 6);
        assert!((info.expected_value - 3.5).abs() < 1e-12);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["mode"], "fair");
    }

    // ============================================================
    // Sampling Tests
    // ============================================================

    #[test]
    fn sample_stays_in_range() {
        let die = Die::new(Some(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for face in die.sample_n(1_000, &mut rng) {
            assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn sample_never_draws_zero_probability_face() {
        let die = Die::new(Some(&[0.0, 1.0, 0.0, 0.0, 0.0, 0.0])).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(die.sample_n(500, &mut rng).iter().all(|&f| f == 2));
    }

    #[test]
    fn sample_frequencies_track_weights() {
        let die = Die::new(Some(&[0.5, 0.1, 0.1, 0.1, 0.1, 0.1])).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let rolls = die.sample_n(20_000, &mut rng);
        let ones = rolls.iter().filter(|&&f| f == 1).count() as f64 / rolls.len() as f64;

        assert!((ones - 0.5).abs() < 0.02, "face 1 frequency {ones}");
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let die = Die::fair();
        let a = die.sample_n(50, &mut ChaCha8Rng::seed_from_u64(5));
        let b = die.sample_n(50, &mut ChaCha8Rng::seed_from_u64(5));

        assert_eq!(a, b);
    }

    // ============================================================
    // redistribute Tests
    // ============================================================

    #[test]
    fn redistribute_to_one_zeroes_others() {
        let fair = [FAIR_PROBABILITY; 6];
        let adjusted = redistribute(&fair, 2, 1.0).unwrap();

        assert_eq!(adjusted[2], 1.0);
        for (i, p) in adjusted.iter().enumerate() {
            if i != 2 {
                assert!(p.abs() < 1e-12);
            }
        }
    }

    #[test]
    fn redistribute_to_zero_is_proportional() {
        let current = [0.5, 0.1, 0.1, 0.1, 0.1, 0.1];
        let adjusted = redistribute(&current, 1, 0.0).unwrap();

        assert_eq!(adjusted[1], 0.0);
        assert!((adjusted[0] - 0.5 / 0.9).abs() < 1e-12);
        assert!((adjusted[2] - 0.1 / 0.9).abs() < 1e-12);
        assert!((adjusted.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn redistribute_splits_equally_when_others_are_zero() {
        let current = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let adjusted = redistribute(&current, 3, 0.5).unwrap();

        assert_eq!(adjusted[3], 0.5);
        for (i, p) in adjusted.iter().enumerate() {
            if i != 3 {
                assert!((p - 0.1).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn redistribute_clamps_value() {
        let fair = [FAIR_PROBABILITY; 6];

        assert_eq!(redistribute(&fair, 0, 1.7).unwrap()[0], 1.0);
        assert_eq!(redistribute(&fair, 0, -0.3).unwrap()[0], 0.0);
        assert_eq!(redistribute(&fair, 0, f64::NAN).unwrap()[0], 0.0);
    }

    #[test]
    fn redistribute_rejects_bad_index() {
        let fair = [FAIR_PROBABILITY; 6];
        let err = redistribute(&fair, 6, 0.2).unwrap_err();

        assert_eq!(err, RollQuestError::face_index(6));
    }

    // ============================================================
    // Property Tests
    // ============================================================

    proptest! {
        #[test]
        fn normalized_probabilities_sum_to_one(
            weights in proptest::collection::vec(0.0f64..100.0, 6)
        ) {
            prop_assume!(weights.iter().sum::<f64>() > 1e-6);
            let die = Die::new(Some(&weights)).unwrap();

            prop_assert!((die.probabilities().iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn normalization_preserves_ordering(
            weights in proptest::collection::vec(0.01f64..100.0, 6)
        ) {
            let die = Die::new(Some(&weights)).unwrap();
            let probs = die.probabilities();

            for i in 0..6 {
                for j in 0..6 {
                    if weights[i] < weights[j] {
                        prop_assert!(probs[i] <= probs[j]);
                    }
                }
            }
        }

        #[test]
        fn redistribute_always_sums_to_one(
            weights in proptest::collection::vec(0.0f64..10.0, 6),
            index in 0usize..6,
            value in -0.5f64..1.5,
        ) {
            prop_assume!(weights.iter().sum::<f64>() > 1e-6);
            let die = Die::new(Some(&weights)).unwrap();
            let adjusted = redistribute(die.probabilities(), index, value).unwrap();

            prop_assert!((adjusted.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            prop_assert!(adjusted.iter().all(|p| *p >= 0.0));
        }
    }
}
