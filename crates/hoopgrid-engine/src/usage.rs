//! Historical-usage weights per filter type.
//!
//! A filter type used on recent grids gets a higher weight, and weights are
//! inverted at selection time — so higher weight means less likely to appear
//! again. The identity key is [`GameFilter::type_descriptor`], which for
//! dynamic filters folds in field and direction but not the live threshold.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;

use hoopgrid_core::{registry, GameFilter, StoredFilter};
use hoopgrid_store::{FilterRole, GridStore, StoreError};

use crate::config::EngineConfig;

/// Weight added per use inside the lookback window.
const USAGE_WEIGHT: f64 = 0.5;
/// Weight added per use inside the very-recent sub-window. Deliberately
/// heavy: a type used in the last two days should almost never repeat.
const VERY_RECENT_WEIGHT: f64 = 5.0;

/// Filter kinds pinned to a fixed weight regardless of history.
///
/// `team` is near-ubiquitous by design — each pick is a different franchise,
/// so recency penalties would only starve the pool.
static HIGH_PRIORITY: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("team", 1.0);
    m
});

/// Compute the selection weight per type descriptor in `pool`.
///
/// Base weight 1.0, plus [`USAGE_WEIGHT`] per use in
/// `[reference − lookback_days, reference]`, plus [`VERY_RECENT_WEIGHT`] per
/// use in `[reference − very_recent_days, reference]`. Stored records that
/// fail to reconstruct fall back to their raw kind tag for counting.
pub fn filter_weights(
    store: &GridStore,
    pool: &[GameFilter],
    role: FilterRole,
    reference: NaiveDate,
    cfg: &EngineConfig,
) -> Result<HashMap<String, f64>, StoreError> {
    let mut weights: HashMap<String, f64> = pool
        .iter()
        .map(|f| (f.type_descriptor(), 1.0))
        .collect();

    let lookback_start = reference - Duration::days(cfg.lookback_days);
    let very_recent_start = reference - Duration::days(cfg.very_recent_days);
    let records = store.filters_in_range(role, lookback_start, reference)?;

    let mut usage: HashMap<String, usize> = HashMap::new();
    let mut very_recent: HashMap<String, usize> = HashMap::new();
    for record in &records {
        let descriptor = stored_descriptor(&record.kind, &record.config);
        *usage.entry(descriptor.clone()).or_insert(0) += 1;
        if record.date >= very_recent_start {
            *very_recent.entry(descriptor).or_insert(0) += 1;
        }
    }

    for (descriptor, weight) in weights.iter_mut() {
        if let Some(&count) = usage.get(descriptor) {
            *weight += count as f64 * USAGE_WEIGHT;
        }
        if let Some(&count) = very_recent.get(descriptor) {
            *weight += count as f64 * VERY_RECENT_WEIGHT;
        }
    }

    // Pinned kinds override whatever history said.
    for filter in pool {
        if let Some(&fixed) = HIGH_PRIORITY.get(filter.kind()) {
            weights.insert(filter.type_descriptor(), fixed);
        }
    }

    Ok(weights)
}

/// Type descriptor of a persisted record, via full reconstruction when
/// possible and the raw kind tag otherwise.
fn stored_descriptor(kind: &str, config: &serde_json::Value) -> String {
    let stored = StoredFilter {
        kind: kind.to_string(),
        config: config.clone(),
    };
    match registry::from_stored(&stored) {
        Ok(filter) => filter.type_descriptor(),
        Err(e) => {
            tracing::debug!(kind, error = %e, "stored filter not reconstructible, using kind tag");
            kind.to_string()
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use hoopgrid_store::FilterRecord;
    use tempfile::TempDir;

    use hoopgrid_core::{Comparison, DynamicConfig, DynamicFilter, StatField, StaticFilter};

    fn open_temp() -> (GridStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = GridStore::open(dir.path().to_str().unwrap()).unwrap();
        (store, dir)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn dynamic(field: StatField) -> GameFilter {
        GameFilter::Dynamic(DynamicFilter {
            config: DynamicConfig {
                field,
                comparison: Comparison::Higher,
                description: "test".to_string(),
                stats_desc: None,
                unit: None,
                detailed_desc: None,
                initial_min: Some(10),
                initial_max: Some(30),
                initial_step: None,
                widen_step: 1,
                narrow_step: 1,
            },
            current_value: 20,
        })
    }

    fn record_for(filter: &GameFilter, date: NaiveDate, role: FilterRole, slot: u8) -> FilterRecord {
        let stored = registry::to_stored(filter).unwrap();
        FilterRecord {
            date,
            role,
            slot,
            kind: stored.kind,
            config: stored.config,
        }
    }

    #[test]
    fn unused_pool_gets_base_weights() {
        let (store, _dir) = open_temp();
        let pool = vec![dynamic(StatField::CareerPpg), dynamic(StatField::CareerRpg)];
        let weights =
            filter_weights(&store, &pool, FilterRole::Dynamic, day(10), &EngineConfig::default())
                .unwrap();
        assert_eq!(weights.len(), 2);
        assert!(weights.values().all(|&w| (w - 1.0).abs() < 1e-9));
    }

    #[test]
    fn recent_usage_raises_only_its_own_type() {
        let (store, _dir) = open_temp();
        let ppg = dynamic(StatField::CareerPpg);
        let rpg = dynamic(StatField::CareerRpg);
        assert_ne!(ppg.type_descriptor(), rpg.type_descriptor());

        // ppg used yesterday (inside both windows)
        store
            .insert_filters(day(9), &[record_for(&ppg, day(9), FilterRole::Dynamic, 0)])
            .unwrap();

        let pool = vec![ppg.clone(), rpg.clone()];
        let cfg = EngineConfig::default();
        let weights = filter_weights(&store, &pool, FilterRole::Dynamic, day(10), &cfg).unwrap();

        // 1.0 base + 0.5 usage + 5.0 very recent
        let ppg_weight = weights[&ppg.type_descriptor()];
        assert!((ppg_weight - 6.5).abs() < 1e-9, "got {ppg_weight}");
        assert!((weights[&rpg.type_descriptor()] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn old_usage_skips_the_recency_penalty() {
        let (store, _dir) = open_temp();
        let ppg = dynamic(StatField::CareerPpg);
        // Five days back: in the lookback window, outside the very-recent one
        store
            .insert_filters(day(5), &[record_for(&ppg, day(5), FilterRole::Dynamic, 0)])
            .unwrap();

        let pool = vec![ppg.clone()];
        let weights =
            filter_weights(&store, &pool, FilterRole::Dynamic, day(10), &EngineConfig::default())
                .unwrap();
        assert!((weights[&ppg.type_descriptor()] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn usage_outside_lookback_is_ignored() {
        let (store, _dir) = open_temp();
        let ppg = dynamic(StatField::CareerPpg);
        store
            .insert_filters(day(1), &[record_for(&ppg, day(1), FilterRole::Dynamic, 0)])
            .unwrap();

        let pool = vec![ppg.clone()];
        let weights =
            filter_weights(&store, &pool, FilterRole::Dynamic, day(10), &EngineConfig::default())
                .unwrap();
        assert!((weights[&ppg.type_descriptor()] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn high_priority_kind_keeps_fixed_weight_despite_usage() {
        let (store, _dir) = open_temp();
        let team = GameFilter::Static(StaticFilter::Team {
            name: "Miami Heat".to_string(),
        });
        store
            .insert_filters(day(9), &[record_for(&team, day(9), FilterRole::Static, 0)])
            .unwrap();

        let pool = vec![team.clone()];
        let weights =
            filter_weights(&store, &pool, FilterRole::Static, day(10), &EngineConfig::default())
                .unwrap();
        assert!((weights[&team.type_descriptor()] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unreconstructible_record_counts_under_its_kind_tag() {
        let (store, _dir) = open_temp();
        // A record whose kind the registry does not know
        let record = FilterRecord {
            date: day(9),
            role: FilterRole::Static,
            slot: 0,
            kind: "retired_filter".to_string(),
            config: serde_json::json!({}),
        };
        store.insert_filters(day(9), &[record]).unwrap();

        let champ = GameFilter::Static(StaticFilter::Champion);
        let pool = vec![champ.clone()];
        let weights =
            filter_weights(&store, &pool, FilterRole::Static, day(10), &EngineConfig::default())
                .unwrap();
        // The alien record must not bleed into the pool's weights
        assert!((weights[&champ.type_descriptor()] - 1.0).abs() < 1e-9);
    }
}
