use crate::{
    error::{MetricsError, MetricsResult},
    outlier::{DEFAULT_IQR_MULTIPLIER, DEFAULT_MIN_SAMPLE},
    summary::MetricName,
    synthetic::SyntheticLedgerConfig,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Tukey fence multiplier `k` in `Q1 − k·IQR`, `Q3 + k·IQR`.
    pub iqr_multiplier: f64,
    /// Fewer defined values than this and a metric yields no outliers.
    pub min_sample: usize,
    /// Metrics the outlier detector runs on, in report order.
    pub monitored_metrics: Vec<MetricName>,
    pub synthetic: SyntheticLedgerConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            min_sample: DEFAULT_MIN_SAMPLE,
            monitored_metrics: vec![
                MetricName::TotalApprovedAmount,
                MetricName::PercentOfFundsUsed,
            ],
            synthetic: SyntheticLedgerConfig::default(),
        }
    }
}

impl MetricsConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: MetricsConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MetricsResult<()> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(MetricsError::Config {
                reason: format!(
                    "iqr_multiplier must be a finite non-negative number, got {}",
                    self.iqr_multiplier
                ),
            });
        }
        if self.min_sample < 2 {
            return Err(MetricsError::Config {
                reason: format!("min_sample must be at least 2, got {}", self.min_sample),
            });
        }
        let synthetic = &self.synthetic;
        for (name, p) in [
            ("approval_probability", synthetic.approval_probability),
            ("usage_probability", synthetic.usage_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(MetricsError::Config {
                    reason: format!("synthetic.{name} must be within [0, 1], got {p}"),
                });
            }
        }
        if synthetic.amount_pareto_xmin <= 0.0 || synthetic.amount_pareto_alpha <= 0.0 {
            return Err(MetricsError::Config {
                reason: "synthetic pareto parameters must be positive".into(),
            });
        }
        Ok(())
    }
}
