//! Headline ledger KPIs: application counts and average amounts.

use crate::record::RecordSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total_applications: u64,
    pub approved_applications: u64,
    pub used_applications: u64,
    /// Mean over rows with a non-null approved amount.
    pub average_approved_amount: Option<f64>,
    /// Mean over rows with a non-null dollars_used, zeros included.
    pub average_used_amount: Option<f64>,
}

impl LedgerTotals {
    /// Row counts, not distinct ids: every ledger row is one application.
    pub fn from_records(records: &RecordSet) -> Self {
        Self {
            total_applications: records.len() as u64,
            approved_applications: records.iter().filter(|r| r.approved).count() as u64,
            used_applications: records.iter().filter(|r| r.is_used()).count() as u64,
            average_approved_amount: mean(records.iter().filter_map(|r| r.approved_amount)),
            average_used_amount: mean(records.iter().filter_map(|r| r.dollars_used)),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .filter(|v| !v.is_nan())
        .fold((0.0f64, 0u64), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}
