//! [`GridBuilder`] — produces the daily 3×3 grid.
//!
//! ## Build protocol
//!
//! 1. **Reuse** — a complete stored grid for the date is reconstructed and
//!    returned unchanged; re-requesting a date never regenerates.
//! 2. **Generate** — up to `num_iterations` attempts:
//!    a. fresh catalogs for the seed,
//!    b. weighted-select 3 rows from the statics (dynamics join the row pool
//!       only past the halfway iteration — all-static rows make more
//!       specific puzzles, so numeric rows are a late concession),
//!    c. build a full weighted draw order over the remaining dynamics and
//!       walk it, tuning each candidate until 3 columns are accepted.
//! 3. **Persist** — one atomic record set plus the derived cell-count
//!    summary. Losing the insert race to a concurrent builder is not an
//!    error: the winner's grid is loaded and returned.
//!
//! Exhausting every iteration is a loud failure. [`GridBuilder::build_or_reuse`]
//! adds the degraded last resort of re-keying the most recent earlier grid.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use hoopgrid_core::{catalog, registry, GameFilter, PlayerPool, StoredFilter};
use hoopgrid_store::{
    FilterRecord, FilterRole, GenerationMode, GridStore, GridSummary, StoreError,
};

use crate::config::EngineConfig;
use crate::error::BuildError;
use crate::{select, tune, usage};

// ─────────────────────────────────────────────
// DailyGrid
// ─────────────────────────────────────────────

/// A complete grid for one date: 3 static rows × 3 tuned dynamic columns.
#[derive(Debug, Clone)]
pub struct DailyGrid {
    pub date: NaiveDate,
    pub rows: Vec<GameFilter>,
    pub columns: Vec<GameFilter>,
    pub mode: GenerationMode,
}

// ─────────────────────────────────────────────
// GridBuilder
// ─────────────────────────────────────────────

/// Builds, persists and reconstructs daily grids.
///
/// All randomness is scoped to one [`StdRng`] seeded per build, so the same
/// `(seed, date, store state)` reproduces the same grid.
pub struct GridBuilder {
    config: EngineConfig,
    seed: u64,
}

impl GridBuilder {
    pub fn new(seed: u64) -> Self {
        Self::with_config(EngineConfig::default(), seed)
    }

    pub fn with_config(config: EngineConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// Return the stored grid for `date`, or generate, tune and persist a
    /// fresh one.
    pub fn get_or_build(
        &self,
        store: &GridStore,
        pool: &PlayerPool,
        date: NaiveDate,
    ) -> Result<DailyGrid, BuildError> {
        if let Some(grid) = self.load_existing(store, date)? {
            if store.get_summary(date)?.is_none() {
                // Backfill the summary for grids stored before it existed.
                store.put_summary(&self.summarize(pool, &grid))?;
            }
            return Ok(grid);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        for iteration in 0..self.config.num_iterations {
            // All-static rows first; open the row pool to dynamics only once
            // the easy half of the budget is spent.
            let allow_dynamic_rows = iteration > self.config.num_iterations / 2;

            match self.attempt(store, pool, date, iteration, allow_dynamic_rows, &mut rng)? {
                Some((rows, columns)) => {
                    return self.persist(store, pool, date, rows, columns);
                }
                None => {
                    tracing::warn!(iteration, date = %date, "grid attempt failed, retrying");
                }
            }
        }

        tracing::error!(
            date = %date,
            iterations = self.config.num_iterations,
            "failed to generate a playable grid"
        );
        Err(BuildError::Exhausted {
            iterations: self.config.num_iterations,
        })
    }

    /// [`get_or_build`](Self::get_or_build), with the cache-reuse last
    /// resort: when generation is exhausted, re-key the most recent earlier
    /// grid onto `date`. The result is flagged [`GenerationMode::Reused`] so
    /// the degraded mode stays visible downstream.
    pub fn build_or_reuse(
        &self,
        store: &GridStore,
        pool: &PlayerPool,
        date: NaiveDate,
    ) -> Result<DailyGrid, BuildError> {
        let exhausted = match self.get_or_build(store, pool, date) {
            Err(BuildError::Exhausted { iterations }) => iterations,
            other => return other,
        };

        let Some(source) = store.latest_date_before(date)? else {
            return Err(BuildError::Exhausted {
                iterations: exhausted,
            });
        };

        tracing::warn!(
            date = %date,
            source = %source,
            "generation exhausted, reusing a previous grid"
        );
        match store.copy_filters(source, date) {
            Ok(_) => {}
            // Someone else wrote the date in the meantime; take their grid.
            Err(StoreError::DuplicateGrid(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let mut grid = self
            .load_existing(store, date)?
            .ok_or(BuildError::IncompleteGrid { date })?;
        grid.mode = GenerationMode::Reused;
        store.put_summary(&self.summarize(pool, &grid))?;
        Ok(grid)
    }

    // ── Reconstruction ─────────────────────────────────

    /// Reconstruct the stored grid for `date`, if a complete one exists.
    ///
    /// A record that fails to rebuild, or a set that is not exactly 3+3,
    /// counts as "no grid" and forces regeneration.
    fn load_existing(
        &self,
        store: &GridStore,
        date: NaiveDate,
    ) -> Result<Option<DailyGrid>, BuildError> {
        let records = store.load_filters(date)?;
        if records.is_empty() {
            return Ok(None);
        }

        let mut rows = Vec::new();
        let mut columns = Vec::new();
        for record in &records {
            let stored = StoredFilter {
                kind: record.kind.clone(),
                config: record.config.clone(),
            };
            match registry::from_stored(&stored) {
                Ok(filter) => match record.role {
                    FilterRole::Static => rows.push(filter),
                    FilterRole::Dynamic => columns.push(filter),
                },
                Err(e) => {
                    tracing::warn!(
                        date = %date,
                        kind = %record.kind,
                        error = %e,
                        "stored filter failed to reconstruct, treating grid as incomplete"
                    );
                    return Ok(None);
                }
            }
        }

        if rows.len() != self.config.num_statics || columns.len() != self.config.num_dynamics {
            tracing::warn!(
                date = %date,
                statics = rows.len(),
                dynamics = columns.len(),
                "stored grid is incomplete, regenerating"
            );
            return Ok(None);
        }

        let mode = store
            .get_summary(date)?
            .map(|s| s.mode)
            .unwrap_or(GenerationMode::Fresh);
        Ok(Some(DailyGrid {
            date,
            rows,
            columns,
            mode,
        }))
    }

    // ── Generation ─────────────────────────────────────

    /// One outer iteration: select rows, then tune columns against them.
    fn attempt(
        &self,
        store: &GridStore,
        pool: &PlayerPool,
        date: NaiveDate,
        iteration: usize,
        allow_dynamic_rows: bool,
        rng: &mut StdRng,
    ) -> Result<Option<(Vec<GameFilter>, Vec<GameFilter>)>, BuildError> {
        let catalog_seed = self.seed.wrapping_add(iteration as u64);
        let statics = catalog::static_filters(pool, catalog_seed);
        let dynamics = catalog::dynamic_filters(catalog_seed);

        let mut row_pool = statics;
        if allow_dynamic_rows {
            row_pool.extend(dynamics.iter().cloned());
        }
        let row_weights =
            usage::filter_weights(store, &row_pool, FilterRole::Static, date, &self.config)?;
        let rows = select::select_weighted(row_pool, &row_weights, self.config.num_statics, rng);
        if rows.len() < self.config.num_statics {
            return Ok(None);
        }
        let row_types: HashSet<String> = rows.iter().map(|f| f.type_descriptor()).collect();

        // The full weighted order, so a failed candidate falls through to
        // the next-most-preferred one instead of aborting the iteration.
        let column_pool: Vec<GameFilter> = dynamics
            .into_iter()
            .filter(|f| !row_types.contains(&f.type_descriptor()))
            .collect();
        let column_weights =
            usage::filter_weights(store, &column_pool, FilterRole::Dynamic, date, &self.config)?;
        let order = select::weighted_order(column_pool, &column_weights, rng);

        let mut columns: Vec<GameFilter> = Vec::with_capacity(self.config.num_dynamics);
        for candidate in order {
            if columns.len() == self.config.num_dynamics {
                break;
            }
            if columns
                .iter()
                .any(|c| c.type_descriptor() == candidate.type_descriptor())
            {
                continue;
            }
            let GameFilter::Dynamic(mut dynamic) = candidate else {
                continue;
            };
            match tune::tune(&mut dynamic, &rows, pool, &self.config) {
                Ok(()) => columns.push(GameFilter::Dynamic(dynamic)),
                Err(failure) => {
                    tracing::debug!(
                        ?failure,
                        "candidate [{}] failed tuning",
                        dynamic.short_desc()
                    );
                }
            }
        }

        if columns.len() == self.config.num_dynamics {
            Ok(Some((rows, columns)))
        } else {
            tracing::warn!(
                date = %date,
                tuned = columns.len(),
                wanted = self.config.num_dynamics,
                "not enough dynamic filters survived tuning"
            );
            Ok(None)
        }
    }

    // ── Persistence ────────────────────────────────────

    fn persist(
        &self,
        store: &GridStore,
        pool: &PlayerPool,
        date: NaiveDate,
        rows: Vec<GameFilter>,
        columns: Vec<GameFilter>,
    ) -> Result<DailyGrid, BuildError> {
        let records = to_records(date, &rows, &columns)?;
        match store.insert_filters(date, &records) {
            Ok(()) => {
                let grid = DailyGrid {
                    date,
                    rows,
                    columns,
                    mode: GenerationMode::Fresh,
                };
                store.put_summary(&self.summarize(pool, &grid))?;
                tracing::info!(date = %date, "stored freshly generated grid");
                Ok(grid)
            }
            Err(StoreError::DuplicateGrid(_)) => {
                // A concurrent builder won the insert; our candidate is
                // discarded and the stored grid is the grid.
                tracing::info!(date = %date, "lost the store race, returning the winner's grid");
                self.load_existing(store, date)?
                    .ok_or(BuildError::IncompleteGrid { date })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Derived 3×3 answer counts. Stored for difficulty display; never fed
    /// back into tuning.
    fn summarize(&self, pool: &PlayerPool, grid: &DailyGrid) -> GridSummary {
        let mut cells = BTreeMap::new();
        for (static_slot, row) in grid.rows.iter().enumerate() {
            for (dynamic_slot, column) in grid.columns.iter().enumerate() {
                cells.insert(
                    GridSummary::cell_key(static_slot, dynamic_slot),
                    tune::cell_count(row, column, pool) as u32,
                );
            }
        }
        GridSummary {
            date: grid.date,
            cells,
            mode: grid.mode,
        }
    }
}

fn to_records(
    date: NaiveDate,
    rows: &[GameFilter],
    columns: &[GameFilter],
) -> Result<Vec<FilterRecord>, BuildError> {
    let mut records = Vec::with_capacity(rows.len() + columns.len());
    for (role, filters) in [(FilterRole::Static, rows), (FilterRole::Dynamic, columns)] {
        for (slot, filter) in filters.iter().enumerate() {
            let stored = registry::to_stored(filter)?;
            records.push(FilterRecord {
                date,
                role,
                slot: slot as u8,
                kind: stored.kind,
                config: stored.config,
            });
        }
    }
    Ok(records)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
