//! Application records: the immutable input of every run.
//!
//! RULE: A RecordSet is built once per run and never mutated.
//! Every stage downstream borrows it; nothing writes back into it.

use crate::{
    error::{MetricsError, MetricsResult},
    types::{ApplicationId, StoreKey},
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// One row of the application ledger.
///
/// `application_id` and `store` are required for grouping but are kept
/// optional here so a loader can hand over rows exactly as it found them.
/// The aggregator rejects rows where either is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(default, deserialize_with = "application_id_from_text_or_int")]
    pub application_id: Option<ApplicationId>,
    pub store: Option<String>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub approved_amount: Option<f64>,
    #[serde(default)]
    pub dollars_used: Option<f64>,
    #[serde(default)]
    pub submit_date: Option<NaiveDate>,
}

impl ApplicationRecord {
    pub fn new(
        application_id: impl Into<ApplicationId>,
        store: impl Into<String>,
        approved: bool,
        approved_amount: Option<f64>,
        dollars_used: Option<f64>,
    ) -> Self {
        Self {
            application_id: Some(application_id.into()),
            store: Some(store.into()),
            approved,
            approved_amount,
            dollars_used,
            submit_date: None,
        }
    }

    pub fn with_submit_date(mut self, date: NaiveDate) -> Self {
        self.submit_date = Some(date);
        self
    }

    /// An application counts as used iff `dollars_used > 0`.
    pub fn is_used(&self) -> bool {
        self.dollars_used.is_some_and(|d| d > 0.0)
    }
}

/// Ledgers carry ids either as text or as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawApplicationId {
    Text(String),
    Int(i64),
}

/// Integer ids become their decimal text, so `101` and `"101"` are the same id.
fn application_id_from_text_or_int<'de, D>(
    deserializer: D,
) -> Result<Option<ApplicationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawApplicationId>::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawApplicationId::Text(text) => text,
        RawApplicationId::Int(n) => n.to_string(),
    }))
}

/// Parse the canonical store key out of a raw `<prefix>_<digits>` field.
///
/// Only the suffix after the last underscore is checked; the prefix text
/// itself is not validated.
pub fn parse_store_key(raw: &str) -> MetricsResult<StoreKey> {
    let malformed = || MetricsError::MalformedStoreKey {
        raw: raw.to_string(),
    };
    let (_, digits) = raw.rsplit_once('_').ok_or_else(malformed)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    digits.parse::<StoreKey>().map_err(|_| malformed())
}

/// Read-only snapshot of application records for a single run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<ApplicationRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<ApplicationRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of records.
    pub fn from_json_str(json: &str) -> MetricsResult<Self> {
        let records: Vec<ApplicationRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        Ok(Self::from_json_str(&content)?)
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApplicationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ApplicationRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = ApplicationRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a ApplicationRecord;
    type IntoIter = std::slice::Iter<'a, ApplicationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
