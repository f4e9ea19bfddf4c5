//! Per-store summary rows and the metric columns they expose.

use crate::{
    error::MetricsError,
    ratio::Ratio,
    types::StoreKey,
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Fully derived metrics for one store. Column order follows the store table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub store: StoreKey,
    pub total_applications: u64,
    pub num_approved_applications: u64,
    pub num_used_applications: u64,
    pub percent_of_apps_approved: Ratio,
    pub percent_of_apps_used: Ratio,
    pub total_approved_amount: f64,
    pub total_used_amount: f64,
    pub percent_of_funds_used: Ratio,
}

impl StoreSummary {
    /// Raw numeric value of one metric column. Counts and sums are always defined.
    pub fn metric(&self, name: MetricName) -> Ratio {
        match name {
            MetricName::TotalApplications => Ratio::Value(self.total_applications as f64),
            MetricName::NumApprovedApplications => {
                Ratio::Value(self.num_approved_applications as f64)
            }
            MetricName::NumUsedApplications => Ratio::Value(self.num_used_applications as f64),
            MetricName::TotalApprovedAmount => Ratio::Value(self.total_approved_amount),
            MetricName::TotalUsedAmount => Ratio::Value(self.total_used_amount),
            MetricName::PercentOfAppsApproved => self.percent_of_apps_approved,
            MetricName::PercentOfAppsUsed => self.percent_of_apps_used,
            MetricName::PercentOfFundsUsed => self.percent_of_funds_used,
        }
    }
}

/// Every numeric column of a StoreSummary that outlier detection can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    TotalApplications,
    NumApprovedApplications,
    NumUsedApplications,
    TotalApprovedAmount,
    TotalUsedAmount,
    PercentOfAppsApproved,
    PercentOfAppsUsed,
    PercentOfFundsUsed,
}

impl MetricName {
    pub const ALL: [MetricName; 8] = [
        MetricName::TotalApplications,
        MetricName::NumApprovedApplications,
        MetricName::NumUsedApplications,
        MetricName::TotalApprovedAmount,
        MetricName::TotalUsedAmount,
        MetricName::PercentOfAppsApproved,
        MetricName::PercentOfAppsUsed,
        MetricName::PercentOfFundsUsed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalApplications => "total_applications",
            Self::NumApprovedApplications => "num_approved_applications",
            Self::NumUsedApplications => "num_used_applications",
            Self::TotalApprovedAmount => "total_approved_amount",
            Self::TotalUsedAmount => "total_used_amount",
            Self::PercentOfAppsApproved => "percent_of_apps_approved",
            Self::PercentOfAppsUsed => "percent_of_apps_used",
            Self::PercentOfFundsUsed => "percent_of_funds_used",
        }
    }

    /// Percentage columns may be undefined; everything else is a count or a sum.
    pub fn is_ratio(&self) -> bool {
        matches!(
            self,
            Self::PercentOfAppsApproved | Self::PercentOfAppsUsed | Self::PercentOfFundsUsed
        )
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| MetricsError::Config {
                reason: format!("unknown metric '{s}'"),
            })
    }
}
