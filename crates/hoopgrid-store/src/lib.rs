//! # hoopgrid-store
//!
//! Date-keyed persistence for daily grids:
//! - [`record::FilterRecord`] — one persisted filter (date, role, slot, config)
//! - [`record::GridSummary`]  — the derived 3×3 cell-count summary
//! - [`store::GridStore`]     — RocksDB store with insert-unique, range-scan
//!   and re-key operations

pub mod error;
pub mod record;
pub mod store;

pub use error::StoreError;
pub use record::{FilterRecord, FilterRole, GenerationMode, GridSummary};
pub use store::GridStore;
