use chrono::NaiveDate;
use thiserror::Error;

use hoopgrid_core::CoreError;
use hoopgrid_store::StoreError;

#[derive(Debug, Error)]
pub enum BuildError {
    /// Every outer iteration failed to produce a playable 3+3 grid.
    /// Surfaced loudly — callers decide fallback policy.
    #[error("no playable grid after {iterations} iterations")]
    Exhausted { iterations: usize },

    /// A grid exists for the date but cannot be reconstructed as exactly
    /// 3 static + 3 dynamic filters.
    #[error("stored grid for {date} is incomplete")]
    IncompleteGrid { date: NaiveDate },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
