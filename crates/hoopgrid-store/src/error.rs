use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A grid already exists for the date — the unique-key contract on
    /// (date, role, slot). Concurrent builders treat this as "lost the race".
    #[error("grid already stored for {0}")]
    DuplicateGrid(NaiveDate),
}
