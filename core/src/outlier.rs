//! Outlier detection: Tukey's IQR fence over one metric column.
//!
//! Quartiles use linear interpolation between order statistics:
//! for a sorted sample of size n and percentile p, rank = p·(n−1), and the
//! quantile interpolates between the two order statistics bracketing rank.
//! Other quantile conventions move the fence, so this one is fixed.
//!
//! A value is an outlier iff it is strictly below `Q1 − k·IQR` or strictly
//! above `Q3 + k·IQR`. Values on a fence are not flagged.

use crate::{
    summary::{MetricName, StoreSummary},
    types::StoreKey,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_MIN_SAMPLE: usize = 4;

/// A single store flagged for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierFlag {
    pub store: StoreKey,
    pub metric: MetricName,
    pub value: f64,
}

/// Quartiles and fences computed from one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TukeyFences {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl TukeyFences {
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Full result of evaluating one metric: the fences (if the sample was large
/// enough) and the stores outside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOutliers {
    pub metric: MetricName,
    pub sample_size: usize,
    pub fences: Option<TukeyFences>,
    pub outliers: Vec<OutlierFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierDetector {
    multiplier: f64,
    min_sample: usize,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::new(DEFAULT_IQR_MULTIPLIER, DEFAULT_MIN_SAMPLE)
    }
}

impl OutlierDetector {
    pub fn new(multiplier: f64, min_sample: usize) -> Self {
        Self {
            multiplier,
            min_sample,
        }
    }

    /// Fences for an unsorted sample, or `None` below the minimum sample size.
    /// An empty sample never has fences, whatever the minimum.
    pub fn fences(&self, sample: &[f64]) -> Option<TukeyFences> {
        if sample.is_empty() || sample.len() < self.min_sample {
            return None;
        }
        let mut sorted = sample.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_linear(&sorted, 0.25);
        let q3 = quantile_linear(&sorted, 0.75);
        let iqr = q3 - q1;
        Some(TukeyFences {
            q1,
            q3,
            iqr,
            lower: q1 - self.multiplier * iqr,
            upper: q3 + self.multiplier * iqr,
        })
    }

    /// Evaluate one metric across all stores. Undefined values are left out
    /// of the sample and can never be flagged.
    pub fn evaluate(&self, metric: MetricName, summaries: &[StoreSummary]) -> MetricOutliers {
        let defined: Vec<(StoreKey, f64)> = summaries
            .iter()
            .filter_map(|s| s.metric(metric).value().map(|v| (s.store, v)))
            .collect();
        let sample: Vec<f64> = defined.iter().map(|&(_, v)| v).collect();

        let Some(fences) = self.fences(&sample) else {
            log::info!(
                "{metric}: {} defined values, below minimum sample {}; no outliers evaluated",
                sample.len(),
                self.min_sample,
            );
            return MetricOutliers {
                metric,
                sample_size: sample.len(),
                fences: None,
                outliers: Vec::new(),
            };
        };

        log::debug!(
            "{metric}: n={} q1={:.4} q3={:.4} iqr={:.4} fence=[{:.4}, {:.4}]",
            sample.len(),
            fences.q1,
            fences.q3,
            fences.iqr,
            fences.lower,
            fences.upper,
        );

        let mut outliers: Vec<OutlierFlag> = defined
            .into_iter()
            .filter(|&(_, value)| fences.is_outlier(value))
            .map(|(store, value)| OutlierFlag {
                store,
                metric,
                value,
            })
            .collect();
        outliers.sort_by_key(|flag| flag.store);

        MetricOutliers {
            metric,
            sample_size: sample.len(),
            fences: Some(fences),
            outliers,
        }
    }

    /// Stores outside the fence for `metric`, ascending by store key.
    pub fn detect(&self, metric: MetricName, summaries: &[StoreSummary]) -> Vec<OutlierFlag> {
        self.evaluate(metric, summaries).outliers
    }
}

/// Quantile of an ascending, non-empty sample by linear interpolation
/// between closest ranks.
pub fn quantile_linear(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty(), "quantile of empty sample");
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
