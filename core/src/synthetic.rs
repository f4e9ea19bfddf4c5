//! Synthetic application ledgers for demos and tests.
//!
//! Same seed and config always produce the same RecordSet, row for row.

use crate::{
    record::{ApplicationRecord, RecordSet},
    rng::LedgerRng,
    types::{Seed, StoreKey},
};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticLedgerConfig {
    pub store_prefix: String,
    pub store_count: u32,
    pub applications_per_store: u32,
    pub approval_probability: f64,
    /// Probability that an approved application draws any funds.
    pub usage_probability: f64,
    pub amount_pareto_xmin: f64,
    pub amount_pareto_alpha: f64,
    /// Store whose approved amounts are scaled by `hot_store_multiplier`.
    pub hot_store: Option<StoreKey>,
    pub hot_store_multiplier: f64,
    pub start_date: NaiveDate,
    pub date_span_days: u32,
}

impl Default for SyntheticLedgerConfig {
    fn default() -> Self {
        Self {
            store_prefix: "store".into(),
            store_count: 12,
            applications_per_store: 40,
            approval_probability: 0.60,
            usage_probability: 0.70,
            amount_pareto_xmin: 500.0,
            amount_pareto_alpha: 2.5,
            hot_store: Some(7),
            hot_store_multiplier: 8.0,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            date_span_days: 365,
        }
    }
}

/// Generate a ledger of `store_count × applications_per_store` rows.
/// Stores are keyed 1..=store_count, each drawing from its own RNG stream.
pub fn generate(seed: Seed, config: &SyntheticLedgerConfig) -> RecordSet {
    let mut records =
        Vec::with_capacity(config.store_count as usize * config.applications_per_store as usize);

    for store in 1..=config.store_count {
        let mut rng = LedgerRng::new(seed, u64::from(store));
        let store_field = format!("{}_{store}", config.store_prefix);
        let multiplier = if config.hot_store == Some(store) {
            config.hot_store_multiplier
        } else {
            1.0
        };

        for _ in 0..config.applications_per_store {
            let mut id_bytes = [0u8; 16];
            rng.fill_bytes(&mut id_bytes);
            let application_id = uuid::Builder::from_random_bytes(id_bytes)
                .into_uuid()
                .to_string();

            let approved = rng.chance(config.approval_probability);
            let (approved_amount, dollars_used) = if approved {
                let amount = cents(
                    rng.pareto(config.amount_pareto_xmin, config.amount_pareto_alpha) * multiplier,
                );
                let used = if rng.chance(config.usage_probability) {
                    cents(amount * rng.uniform(0.2, 1.0))
                } else {
                    0.0
                };
                (Some(amount), Some(used))
            } else {
                (None, None)
            };

            let offset = rng.day_offset(config.date_span_days);
            let mut record = ApplicationRecord::new(
                application_id,
                store_field.as_str(),
                approved,
                approved_amount,
                dollars_used,
            );
            if let Some(date) = config.start_date.checked_add_days(Days::new(offset)) {
                record = record.with_submit_date(date);
            }
            records.push(record);
        }
    }

    log::debug!(
        "generated synthetic ledger: seed={seed} stores={} rows={}",
        config.store_count,
        records.len()
    );
    RecordSet::new(records)
}

fn cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
