//! Ratio derivation: percentages with an explicit undefined sentinel.

use crate::{
    aggregator::StoreAggregate,
    error::MetricsResult,
    summary::StoreSummary,
};
use serde::{Deserialize, Serialize};

/// A derived percentage.
///
/// `Undefined` marks a zero denominator. It is never zero and never
/// infinity, and outlier detection drops it from the sample.
/// Serialises as a number, or `null` when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Ratio {
    Value(f64),
    Undefined,
}

impl Ratio {
    /// `numerator / denominator * 100`, or `Undefined` when the denominator is zero.
    pub fn percent(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Ratio::Undefined
        } else {
            Ratio::Value(numerator / denominator * 100.0)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Ratio::Value(v) => Some(v),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Ratio::Undefined)
    }
}

impl From<Option<f64>> for Ratio {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Ratio::Undefined, Ratio::Value)
    }
}

impl From<Ratio> for Option<f64> {
    fn from(ratio: Ratio) -> Self {
        ratio.value()
    }
}

pub struct RatioDeriver;

impl RatioDeriver {
    /// Attach the three percentage columns. No rounding.
    pub fn derive(aggregate: &StoreAggregate) -> StoreSummary {
        let total = aggregate.total_applications as f64;
        StoreSummary {
            store: aggregate.store,
            total_applications: aggregate.total_applications,
            num_approved_applications: aggregate.num_approved_applications,
            num_used_applications: aggregate.num_used_applications,
            percent_of_apps_approved: Ratio::percent(
                aggregate.num_approved_applications as f64,
                total,
            ),
            percent_of_apps_used: Ratio::percent(aggregate.num_used_applications as f64, total),
            total_approved_amount: aggregate.total_approved_amount,
            total_used_amount: aggregate.total_used_amount,
            percent_of_funds_used: Ratio::percent(
                aggregate.total_used_amount,
                aggregate.total_approved_amount,
            ),
        }
    }

    /// Validate and derive a whole aggregate set, preserving order.
    pub fn derive_all(aggregates: &[StoreAggregate]) -> MetricsResult<Vec<StoreSummary>> {
        aggregates
            .iter()
            .map(|aggregate| {
                aggregate.validate()?;
                Ok(Self::derive(aggregate))
            })
            .collect()
    }
}
