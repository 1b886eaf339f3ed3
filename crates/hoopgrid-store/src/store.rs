//! RocksDB-backed grid persistence.
//!
//! Two column families:
//! - `filters` — key `"<YYYY-MM-DD>:<role>:<slot>"` → [`FilterRecord`] JSON
//! - `grids`   — key `"<YYYY-MM-DD>"` → [`GridSummary`] JSON
//!
//! ISO dates are zero-padded, so lexicographic key order is chronological and
//! date-range queries are plain forward scans.

use chrono::NaiveDate;
use rocksdb::{ColumnFamilyDescriptor, DBCompressionType, Direction, IteratorMode, Options, DB};

use crate::error::StoreError;
use crate::record::{FilterRecord, FilterRole, GridSummary};

const CF_FILTERS: &str = "filters";
const CF_GRIDS: &str = "grids";

/// Slots per role in a complete grid.
pub const SLOTS_PER_ROLE: u8 = 3;

/// Persistent store for daily grid filters and summaries.
pub struct GridStore {
    db: DB,
}

impl GridStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let mut cf_opts = Options::default();
        cf_opts.set_compression_type(DBCompressionType::Lz4);

        let cf_descs = vec![
            ColumnFamilyDescriptor::new(CF_FILTERS, cf_opts.clone()),
            ColumnFamilyDescriptor::new(CF_GRIDS, cf_opts),
        ];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descs)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    #[inline]
    fn cf_filters(&self) -> &rocksdb::ColumnFamily {
        self.db.cf_handle(CF_FILTERS).unwrap()
    }

    #[inline]
    fn cf_grids(&self) -> &rocksdb::ColumnFamily {
        self.db.cf_handle(CF_GRIDS).unwrap()
    }

    // ── Filter records ─────────────────────────────────

    /// Insert a full record set for a date, or fail without writing anything.
    ///
    /// Refuses with [`StoreError::DuplicateGrid`] if any (date, role, slot)
    /// key already exists, then writes the whole set in one atomic batch —
    /// a reader can never observe a partial grid.
    pub fn insert_filters(
        &self,
        date: NaiveDate,
        records: &[FilterRecord],
    ) -> Result<(), StoreError> {
        for record in records {
            let key = filter_key(record.date, record.role, record.slot);
            let existing = self
                .db
                .get_cf(&self.cf_filters(), key.as_bytes())
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            if existing.is_some() {
                return Err(StoreError::DuplicateGrid(date));
            }
        }

        let mut batch = rocksdb::WriteBatch::default();
        for record in records {
            let key = filter_key(record.date, record.role, record.slot);
            let value = serde_json::to_vec(record)?;
            batch.put_cf(&self.cf_filters(), key.as_bytes(), &value);
        }
        self.db
            .write(batch)
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    /// All stored records for a date, statics first, each role ordered by slot.
    ///
    /// Returns whatever exists — completeness (exactly 3+3) is the caller's
    /// contract to check.
    pub fn load_filters(&self, date: NaiveDate) -> Result<Vec<FilterRecord>, StoreError> {
        let mut records = Vec::with_capacity(2 * SLOTS_PER_ROLE as usize);
        for role in [FilterRole::Static, FilterRole::Dynamic] {
            for slot in 0..SLOTS_PER_ROLE {
                let key = filter_key(date, role, slot);
                if let Some(bytes) = self
                    .db
                    .get_cf(&self.cf_filters(), key.as_bytes())
                    .map_err(|e| StoreError::Storage(e.to_string()))?
                {
                    records.push(serde_json::from_slice(&bytes)?);
                }
            }
        }
        Ok(records)
    }

    /// All records of `role` with date in `[from, to]`, used for usage weighting.
    pub fn filters_in_range(
        &self,
        role: FilterRole,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FilterRecord>, StoreError> {
        let start = from.to_string();
        let iter = self.db.iterator_cf(
            &self.cf_filters(),
            IteratorMode::From(start.as_bytes(), Direction::Forward),
        );

        let mut records = Vec::new();
        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Storage(e.to_string()))?;
            let record: FilterRecord = serde_json::from_slice(&value)?;
            if record.date > to {
                break;
            }
            if record.role == role {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Re-key a full record set onto a new date — the cache-reuse fallback.
    ///
    /// Configurations (including live tuned thresholds) are preserved
    /// verbatim. Returns the number of records copied.
    pub fn copy_filters(&self, from: NaiveDate, to: NaiveDate) -> Result<usize, StoreError> {
        let mut records = self.load_filters(from)?;
        for record in &mut records {
            record.date = to;
        }
        let copied = records.len();
        self.insert_filters(to, &records)?;
        tracing::warn!(from = %from, to = %to, copied, "reused stored grid for new date");
        Ok(copied)
    }

    /// Newest date strictly before `date` that has at least one record.
    pub fn latest_date_before(&self, date: NaiveDate) -> Result<Option<NaiveDate>, StoreError> {
        let upper = date.to_string();
        let iter = self.db.iterator_cf(
            &self.cf_filters(),
            IteratorMode::From(upper.as_bytes(), Direction::Reverse),
        );
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Storage(e.to_string()))?;
            if let Some(d) = date_from_key(&key) {
                if d < date {
                    return Ok(Some(d));
                }
            }
        }
        Ok(None)
    }

    /// Remove every filter record and the summary for a date.
    /// Administrative regeneration support; returns how many records existed.
    pub fn delete_filters(&self, date: NaiveDate) -> Result<usize, StoreError> {
        let existing = self.load_filters(date)?;
        let mut batch = rocksdb::WriteBatch::default();
        for record in &existing {
            let key = filter_key(record.date, record.role, record.slot);
            batch.delete_cf(&self.cf_filters(), key.as_bytes());
        }
        batch.delete_cf(&self.cf_grids(), date.to_string().as_bytes());
        self.db
            .write(batch)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(existing.len())
    }

    // ── Grid summaries ─────────────────────────────────

    /// Write (or overwrite) the cell-count summary for a date.
    pub fn put_summary(&self, summary: &GridSummary) -> Result<(), StoreError> {
        let value = serde_json::to_vec(summary)?;
        self.db
            .put_cf(&self.cf_grids(), summary.date.to_string().as_bytes(), &value)
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    pub fn get_summary(&self, date: NaiveDate) -> Result<Option<GridSummary>, StoreError> {
        match self
            .db
            .get_cf(&self.cf_grids(), date.to_string().as_bytes())
            .map_err(|e| StoreError::Storage(e.to_string()))?
        {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

// ─────────────────────────────────────────────
// Key helpers
// ─────────────────────────────────────────────

fn filter_key(date: NaiveDate, role: FilterRole, slot: u8) -> String {
    format!("{date}:{}:{slot}", role.as_str())
}

/// Parse the leading `YYYY-MM-DD` of a filter key.
fn date_from_key(key: &[u8]) -> Option<NaiveDate> {
    let text = std::str::from_utf8(key).ok()?;
    let (date_part, _) = text.split_once(':')?;
    date_part.parse().ok()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GenerationMode;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn open_temp() -> (GridStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = GridStore::open(dir.path().to_str().unwrap()).unwrap();
        (store, dir)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn record(date: NaiveDate, role: FilterRole, slot: u8) -> FilterRecord {
        FilterRecord {
            date,
            role,
            slot,
            kind: "usa_born".to_string(),
            config: serde_json::json!({}),
        }
    }

    fn full_set(date: NaiveDate) -> Vec<FilterRecord> {
        let mut records = Vec::new();
        for role in [FilterRole::Static, FilterRole::Dynamic] {
            for slot in 0..3 {
                records.push(record(date, role, slot));
            }
        }
        records
    }

    #[test]
    fn insert_and_load_round_trip() {
        let (store, _dir) = open_temp();
        store.insert_filters(day(4), &full_set(day(4))).unwrap();

        let loaded = store.load_filters(day(4)).unwrap();
        assert_eq!(loaded.len(), 6);
        assert_eq!(loaded[0].role, FilterRole::Static);
        assert_eq!(loaded[0].slot, 0);
        assert_eq!(loaded[5].role, FilterRole::Dynamic);
        assert_eq!(loaded[5].slot, 2);
    }

    #[test]
    fn duplicate_insert_is_rejected_without_partial_write() {
        let (store, _dir) = open_temp();
        store.insert_filters(day(4), &full_set(day(4))).unwrap();

        let mut second = full_set(day(4));
        second[0].kind = "champion".to_string();
        let err = store.insert_filters(day(4), &second).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateGrid(d) if d == day(4)));

        // Original records untouched
        let loaded = store.load_filters(day(4)).unwrap();
        assert_eq!(loaded.len(), 6);
        assert_eq!(loaded[0].kind, "usa_born");
    }

    #[test]
    fn missing_date_loads_empty() {
        let (store, _dir) = open_temp();
        assert!(store.load_filters(day(9)).unwrap().is_empty());
    }

    #[test]
    fn range_scan_filters_by_role_and_date() {
        let (store, _dir) = open_temp();
        store.insert_filters(day(1), &full_set(day(1))).unwrap();
        store.insert_filters(day(3), &full_set(day(3))).unwrap();
        store.insert_filters(day(7), &full_set(day(7))).unwrap();

        let statics = store
            .filters_in_range(FilterRole::Static, day(2), day(6))
            .unwrap();
        assert_eq!(statics.len(), 3);
        assert!(statics.iter().all(|r| r.date == day(3)));
        assert!(statics.iter().all(|r| r.role == FilterRole::Static));
    }

    #[test]
    fn copy_filters_rekeys_full_set() {
        let (store, _dir) = open_temp();
        store.insert_filters(day(1), &full_set(day(1))).unwrap();

        let copied = store.copy_filters(day(1), day(2)).unwrap();
        assert_eq!(copied, 6);

        let loaded = store.load_filters(day(2)).unwrap();
        assert_eq!(loaded.len(), 6);
        assert!(loaded.iter().all(|r| r.date == day(2)));
        // Source untouched
        assert_eq!(store.load_filters(day(1)).unwrap().len(), 6);
    }

    #[test]
    fn latest_date_before_skips_same_day() {
        let (store, _dir) = open_temp();
        store.insert_filters(day(1), &full_set(day(1))).unwrap();
        store.insert_filters(day(4), &full_set(day(4))).unwrap();

        assert_eq!(store.latest_date_before(day(4)).unwrap(), Some(day(1)));
        assert_eq!(store.latest_date_before(day(9)).unwrap(), Some(day(4)));
        assert_eq!(store.latest_date_before(day(1)).unwrap(), None);
    }

    #[test]
    fn delete_filters_removes_records_and_summary() {
        let (store, _dir) = open_temp();
        store.insert_filters(day(4), &full_set(day(4))).unwrap();
        store
            .put_summary(&GridSummary {
                date: day(4),
                cells: BTreeMap::new(),
                mode: GenerationMode::Fresh,
            })
            .unwrap();

        let removed = store.delete_filters(day(4)).unwrap();
        assert_eq!(removed, 6);
        assert!(store.load_filters(day(4)).unwrap().is_empty());
        assert!(store.get_summary(day(4)).unwrap().is_none());
    }

    #[test]
    fn summary_round_trip() {
        let (store, _dir) = open_temp();
        let mut cells = BTreeMap::new();
        cells.insert(GridSummary::cell_key(0, 0), 12u32);
        cells.insert(GridSummary::cell_key(2, 1), 7u32);
        let summary = GridSummary {
            date: day(4),
            cells,
            mode: GenerationMode::Fresh,
        };
        store.put_summary(&summary).unwrap();
        assert_eq!(store.get_summary(day(4)).unwrap().unwrap(), summary);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap().to_string();
        {
            let store = GridStore::open(&path).unwrap();
            store.insert_filters(day(4), &full_set(day(4))).unwrap();
        }
        {
            let store = GridStore::open(&path).unwrap();
            assert_eq!(store.load_filters(day(4)).unwrap().len(), 6);
        }
    }
}
