//! Store metrics aggregation and outlier detection over an application ledger.
//!
//! Records flow one way: RecordSet -> StoreAggregator -> RatioDeriver ->
//! OutlierDetector. `engine::MetricsEngine` runs the whole sequence.

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod outlier;
pub mod ratio;
pub mod record;
pub mod rng;
pub mod store;
pub mod summary;
pub mod synthetic;
pub mod totals;
pub mod types;
