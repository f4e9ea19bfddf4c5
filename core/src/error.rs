use crate::types::StoreKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error(
        "Malformed record at row {row}: missing or invalid '{field}' (application_id={})",
        .application_id.as_deref().unwrap_or("<none>")
    )]
    MalformedRecord {
        row: usize,
        field: &'static str,
        application_id: Option<String>,
    },

    #[error("Malformed store key '{raw}': expected <prefix>_<digits>")]
    MalformedStoreKey { raw: String },

    #[error("Inconsistent summary for store {store}: subset count exceeds total applications")]
    InconsistentSummary { store: StoreKey },

    #[error("Invalid config: {reason}")]
    Config { reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
