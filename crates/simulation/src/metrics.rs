//! Distribution summaries used to aggregate batches of simulation runs.

use serde::{Deserialize, Serialize};

/// Summary statistics for a distribution of outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Median value (50th percentile).
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Key percentiles (5th, 10th, 25th, 50th, 75th, 90th, 95th).
    pub percentiles: Vec<(f64, f64)>,
}

impl DistributionSummary {
    /// Creates a summary from a slice of values.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::empty();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        let median = percentile(&sorted, 0.50);

        let percentiles = [0.05, 0.10, 0.25, 0.50, 0.75, 0.90, 0.95]
            .iter()
            .map(|&p| (p, percentile(&sorted, p)))
            .collect();

        Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean,
            median,
            std_dev: variance.sqrt(),
            percentiles,
        }
    }

    /// Returns an empty summary.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            percentiles: vec![],
        }
    }

    /// Looks up a stored percentile (0.05 for the 5th).
    #[must_use]
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(q, _)| (q - p).abs() < 1e-9)
            .map(|(_, v)| *v)
    }
}

/// Percentile of a sorted slice with linear interpolation between closest ranks.
///
/// `p` is a fraction in [0, 1]. Returns 0 for an empty slice.
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let weight = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * weight
        }
    }
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Count per bin.
    pub counts: Vec<usize>,
    /// Bin edges, one more than the number of bins.
    pub bins: Vec<f64>,
}

impl Histogram {
    /// Buckets `values` into `bins` equal-width bins spanning their range.
    ///
    /// The last bin is closed on the right so the maximum is counted. When every
    /// value is equal the range is widened to `[v - 0.5, v + 0.5]`.
    #[must_use]
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if values.is_empty() {
            lo = 0.0;
            hi = 1.0;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        edges[bins] = hi;

        let mut counts = vec![0; bins];
        for &v in values {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self {
            counts,
            bins: edges,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
