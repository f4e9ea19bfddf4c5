//! The metrics engine: one run over one immutable RecordSet.
//!
//! EXECUTION ORDER (fixed):
//!   1. StoreAggregator   records    -> per-store counts and sums
//!   2. RatioDeriver      aggregates -> StoreSummary rows
//!   3. OutlierDetector   once per monitored metric, independently
//!
//! RULES:
//!   - Nothing is cached between runs; every run recomputes from the records.
//!   - A malformed record or store key aborts the run. No partial report.
//!   - Outlier results per metric are never merged or deduplicated.

use crate::{
    aggregator::StoreAggregator,
    config::MetricsConfig,
    error::MetricsResult,
    outlier::{MetricOutliers, OutlierDetector, OutlierFlag},
    ratio::RatioDeriver,
    record::RecordSet,
    summary::{MetricName, StoreSummary},
    totals::LedgerTotals,
    types::StoreKey,
};
use serde::{Deserialize, Serialize};

/// Everything one run produces, in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub totals: LedgerTotals,
    pub stores: Vec<StoreSummary>,
    pub outliers: Vec<MetricOutliers>,
}

impl MetricsReport {
    /// Flags for `metric`, or an empty slice if it was not monitored.
    pub fn outliers_for(&self, metric: MetricName) -> &[OutlierFlag] {
        self.outliers
            .iter()
            .find(|m| m.metric == metric)
            .map(|m| m.outliers.as_slice())
            .unwrap_or_default()
    }

    pub fn store(&self, store: StoreKey) -> Option<&StoreSummary> {
        self.stores.iter().find(|s| s.store == store)
    }
}

pub struct MetricsEngine {
    config: MetricsConfig,
    detector: OutlierDetector,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig) -> MetricsResult<Self> {
        config.validate()?;
        let detector = OutlierDetector::new(config.iqr_multiplier, config.min_sample);
        Ok(Self { config, detector })
    }

    /// Steps 1 and 2: one summary per store, ascending by store key.
    pub fn summarize(&self, records: &RecordSet) -> MetricsResult<Vec<StoreSummary>> {
        let aggregates = StoreAggregator::aggregate(records)?;
        RatioDeriver::derive_all(&aggregates)
    }

    /// Run the full pipeline.
    pub fn run(&self, records: &RecordSet) -> MetricsResult<MetricsReport> {
        log::info!("metrics run: {} records", records.len());

        let stores = self.summarize(records).inspect_err(|e| {
            log::error!("metrics run rejected: {e}");
        })?;

        let outliers: Vec<MetricOutliers> = self
            .config
            .monitored_metrics
            .iter()
            .map(|&metric| {
                let result = self.detector.evaluate(metric, &stores);
                for flag in &result.outliers {
                    log::warn!(
                        "store {} is an outlier in {} (value={:.2})",
                        flag.store,
                        flag.metric,
                        flag.value,
                    );
                }
                result
            })
            .collect();

        let report = MetricsReport {
            totals: LedgerTotals::from_records(records),
            stores,
            outliers,
        };
        log::info!(
            "metrics run complete: {} stores, {} outlier flags across {} metrics",
            report.stores.len(),
            report.outliers.iter().map(|m| m.outliers.len()).sum::<usize>(),
            report.outliers.len(),
        );
        Ok(report)
    }
}
