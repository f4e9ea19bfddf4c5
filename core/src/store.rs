//! SQLite ledger source.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never sees a connection; it receives a RecordSet.
//! Nothing computed by the engine is written back.

use crate::{
    error::{MetricsError, MetricsResult},
    record::{ApplicationRecord, RecordSet},
};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    /// Open (or create) the ledger database at `path`.
    pub fn open(path: &str) -> MetricsResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> MetricsResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> MetricsResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_applications.sql"))?;
        Ok(())
    }

    // ── Writes (ingest only) ───────────────────────────────────

    pub fn insert_application(&self, record: &ApplicationRecord) -> MetricsResult<()> {
        self.conn.execute(
            "INSERT INTO application
                (application_id, store, approved, approved_amount, dollars_used, submit_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.application_id,
                record.store,
                record.approved,
                record.approved_amount,
                record.dollars_used,
                record.submit_date.map(|d| d.format(DATE_FORMAT).to_string()),
            ],
        )?;
        Ok(())
    }

    /// Insert a whole RecordSet in one transaction.
    pub fn insert_applications(&self, records: &RecordSet) -> MetricsResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for record in records {
            self.insert_application(record)?;
        }
        tx.commit()?;
        log::info!("ingested {} application rows", records.len());
        Ok(())
    }

    // ── Reads ──────────────────────────────────────────────────

    pub fn application_count(&self) -> MetricsResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM application", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Every ledger row, in insertion order.
    pub fn load_records(&self) -> MetricsResult<RecordSet> {
        let mut stmt = self.conn.prepare(
            "SELECT application_id, store, approved, approved_amount, dollars_used, submit_date
             FROM application ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    ApplicationRecord {
                        application_id: row.get(0)?,
                        store: row.get(1)?,
                        approved: row.get(2)?,
                        approved_amount: row.get(3)?,
                        dollars_used: row.get(4)?,
                        submit_date: None,
                    },
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(row, (mut record, raw_date))| {
                if let Some(raw) = raw_date {
                    let date = NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| {
                        MetricsError::MalformedRecord {
                            row,
                            field: "submit_date",
                            application_id: record.application_id.clone(),
                        }
                    })?;
                    record.submit_date = Some(date);
                }
                Ok(record)
            })
            .collect::<MetricsResult<Vec<_>>>()?;

        log::debug!("loaded {} application rows", records.len());
        Ok(RecordSet::new(records))
    }
}
