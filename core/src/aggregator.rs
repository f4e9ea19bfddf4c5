//! Store aggregator: group-by over the application ledger.
//!
//! Three independent passes over the same keyed rows:
//!   (a) all records          -> distinct application count
//!   (b) approved records     -> distinct count + sum of approved_amount
//!   (c) used records         -> distinct count + sum of dollars_used
//!
//! The partials are merged by an outer join over the key set of pass (a),
//! which is always the complete set of stores. A store missing from (b) or
//! (c) gets an explicit zero partial, never an absent row.

use crate::{
    error::{MetricsError, MetricsResult},
    record::{parse_store_key, ApplicationRecord, RecordSet},
    types::StoreKey,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Count and sum aggregates for one store, before any ratio is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreAggregate {
    pub store: StoreKey,
    pub total_applications: u64,
    pub num_approved_applications: u64,
    pub total_approved_amount: f64,
    pub num_used_applications: u64,
    pub total_used_amount: f64,
}

impl StoreAggregate {
    /// Reject aggregates whose subset counts exceed the store's total.
    ///
    /// Aggregates built from records always pass; this guards summaries
    /// assembled elsewhere before ratios are derived from them.
    pub fn validate(&self) -> MetricsResult<()> {
        if self.num_approved_applications > self.total_applications
            || self.num_used_applications > self.total_applications
        {
            return Err(MetricsError::InconsistentSummary { store: self.store });
        }
        Ok(())
    }
}

/// Distinct-id count and amount sum for one store within one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Partial {
    count: u64,
    amount: f64,
}

impl Partial {
    /// Default for a store with no rows in a filtered pass.
    const ZERO: Partial = Partial {
        count: 0,
        amount: 0.0,
    };
}

/// A validated row: canonical store key and application id resolved.
struct KeyedRow<'a> {
    store: StoreKey,
    application_id: &'a str,
    record: &'a ApplicationRecord,
}

pub struct StoreAggregator;

impl StoreAggregator {
    /// One aggregate per distinct store key, ascending by key.
    ///
    /// Fails on the first row with a missing store or application id, or a
    /// store field that does not parse. No partial result is returned.
    pub fn aggregate(records: &RecordSet) -> MetricsResult<Vec<StoreAggregate>> {
        let rows = key_rows(records)?;

        let totals = partial_by_store(rows.iter(), |_| None);
        let approved = partial_by_store(
            rows.iter().filter(|r| r.record.approved),
            |rec| rec.approved_amount,
        );
        let used = partial_by_store(
            rows.iter().filter(|r| r.record.is_used()),
            |rec| rec.dollars_used,
        );

        let aggregates: Vec<StoreAggregate> = totals
            .into_iter()
            .map(|(store, total)| {
                let approved = approved.get(&store).copied().unwrap_or(Partial::ZERO);
                let used = used.get(&store).copied().unwrap_or(Partial::ZERO);
                StoreAggregate {
                    store,
                    total_applications: total.count,
                    num_approved_applications: approved.count,
                    total_approved_amount: approved.amount,
                    num_used_applications: used.count,
                    total_used_amount: used.amount,
                }
            })
            .collect();

        log::debug!(
            "aggregated {} records into {} stores",
            records.len(),
            aggregates.len()
        );
        Ok(aggregates)
    }
}

fn key_rows(records: &RecordSet) -> MetricsResult<Vec<KeyedRow<'_>>> {
    records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let application_id =
                record
                    .application_id
                    .as_deref()
                    .ok_or(MetricsError::MalformedRecord {
                        row,
                        field: "application_id",
                        application_id: None,
                    })?;
            let raw_store = record
                .store
                .as_deref()
                .ok_or_else(|| MetricsError::MalformedRecord {
                    row,
                    field: "store",
                    application_id: Some(application_id.to_string()),
                })?;
            Ok(KeyedRow {
                store: parse_store_key(raw_store)?,
                application_id,
                record,
            })
        })
        .collect()
}

/// Group rows by store: distinct application ids, and the sum of `amount`
/// over every row (null and NaN contribute zero).
fn partial_by_store<'v, 'r: 'v, I, F>(rows: I, amount: F) -> BTreeMap<StoreKey, Partial>
where
    I: Iterator<Item = &'v KeyedRow<'r>>,
    F: Fn(&ApplicationRecord) -> Option<f64>,
{
    let mut groups: BTreeMap<StoreKey, (HashSet<&'r str>, f64)> = BTreeMap::new();
    for row in rows {
        let (ids, sum) = groups.entry(row.store).or_default();
        ids.insert(row.application_id);
        *sum += amount(row.record).filter(|v| !v.is_nan()).unwrap_or(0.0);
    }
    groups
        .into_iter()
        .map(|(store, (ids, amount))| {
            (
                store,
                Partial {
                    count: ids.len() as u64,
                    amount,
                },
            )
        })
        .collect()
}
