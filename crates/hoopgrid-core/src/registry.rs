//! Explicit filter registry: a compile-time mapping between stable string
//! tags and filter constructors.
//!
//! Persisted grids store `(kind, config)` pairs; reconstruction goes through
//! [`from_stored`], a closed match over the supported tags. No reflection,
//! no dynamic lookup — adding a filter kind means adding an arm here, which
//! keeps the persisted surface auditable.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::error::CoreError;
use crate::filter::{DynamicFilter, GameFilter, StaticFilter};

/// Serialized form of one filter: class tag plus flat JSON config.
///
/// Dynamic configs carry the live threshold under the reserved
/// `current_value` key, so a reconstructed filter resumes exactly where
/// tuning left it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFilter {
    pub kind: String,
    pub config: JsonValue,
}

/// Serialize a filter into its stored representation.
pub fn to_stored(filter: &GameFilter) -> Result<StoredFilter, CoreError> {
    let (kind, config) = match filter {
        GameFilter::Dynamic(f) => ("dynamic", serde_json::to_value(f)?),
        GameFilter::Static(f) => (
            f.kind(),
            match f {
                StaticFilter::Team { name } => json!({ "team_name": name }),
                StaticFilter::Position { role } => json!({ "role": role }),
                StaticFilter::LastInitial { letter } => json!({ "letter": letter }),
                _ => json!({}),
            },
        ),
    };
    Ok(StoredFilter {
        kind: kind.to_string(),
        config,
    })
}

/// Reconstruct a filter from its stored representation.
///
/// Unknown tags and malformed configs are errors — a persisted record that
/// cannot be rebuilt means the grid for that date is incomplete, never a
/// silently different puzzle.
pub fn from_stored(stored: &StoredFilter) -> Result<GameFilter, CoreError> {
    let filter = match stored.kind.as_str() {
        "dynamic" => {
            let f: DynamicFilter =
                serde_json::from_value(stored.config.clone()).map_err(|e| bad(stored, e))?;
            GameFilter::Dynamic(f)
        }
        "usa_born" => GameFilter::Static(StaticFilter::UsaBorn),
        "international" => GameFilter::Static(StaticFilter::International),
        "all_league" => GameFilter::Static(StaticFilter::AllLeague),
        "all_defensive" => GameFilter::Static(StaticFilter::AllDefensive),
        "all_rookie" => GameFilter::Static(StaticFilter::AllRookie),
        "champion" => GameFilter::Static(StaticFilter::Champion),
        "all_star" => GameFilter::Static(StaticFilter::AllStar),
        "olympic_medalist" => GameFilter::Static(StaticFilter::OlympicMedalist),
        "top_draft_pick" => GameFilter::Static(StaticFilter::TopDraftPick),
        "team" => GameFilter::Static(StaticFilter::Team {
            name: required_str(stored, "team_name")?,
        }),
        "position" => GameFilter::Static(StaticFilter::Position {
            role: required_str(stored, "role")?,
        }),
        "last_initial" => {
            let letter: char = stored
                .config
                .get("letter")
                .cloned()
                .ok_or_else(|| missing(stored, "letter"))
                .and_then(|v| serde_json::from_value(v).map_err(|e| bad(stored, e)))?;
            GameFilter::Static(StaticFilter::LastInitial { letter })
        }
        other => return Err(CoreError::UnknownFilterKind(other.to_string())),
    };
    Ok(filter)
}

fn required_str(stored: &StoredFilter, key: &str) -> Result<String, CoreError> {
    stored
        .config
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| missing(stored, key))
}

fn missing(stored: &StoredFilter, key: &str) -> CoreError {
    CoreError::BadFilterConfig {
        kind: stored.kind.clone(),
        reason: format!("missing key `{key}`"),
    }
}

fn bad(stored: &StoredFilter, e: serde_json::Error) -> CoreError {
    CoreError::BadFilterConfig {
        kind: stored.kind.clone(),
        reason: e.to_string(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::player::{Player, PlayerPool};

    fn sample_pool() -> PlayerPool {
        let players = (0..30)
            .map(|i| Player {
                stats_id: i,
                name: format!("Sam Jones{i}"),
                teams: vec!["Boston Celtics".to_string()],
                ..Player::default()
            })
            .collect();
        PlayerPool::new(players)
    }

    #[test]
    fn every_catalog_filter_round_trips() {
        let pool = sample_pool();
        let mut filters = catalog::static_filters(&pool, 11);
        filters.extend(catalog::dynamic_filters(11));

        for original in filters {
            let stored = to_stored(&original).unwrap();
            let rebuilt = from_stored(&stored).unwrap();
            assert_eq!(rebuilt.short_desc(), original.short_desc());
            assert_eq!(rebuilt.type_descriptor(), original.type_descriptor());

            // Same filtering behavior on the live pool
            let refs = pool.all();
            let before: Vec<u32> = original.apply(&refs).iter().map(|p| p.stats_id).collect();
            let after: Vec<u32> = rebuilt.apply(&refs).iter().map(|p| p.stats_id).collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn dynamic_round_trip_resumes_threshold() {
        let mut filters = catalog::dynamic_filters(5);
        let mut filter = filters.remove(0);
        let dynamic = filter.as_dynamic_mut().unwrap();
        dynamic.narrow();
        let tuned_value = dynamic.current_value;

        let stored = to_stored(&filter).unwrap();
        assert_eq!(
            stored.config.get("current_value").and_then(|v| v.as_i64()),
            Some(tuned_value),
            "live threshold must be stored under the reserved key"
        );

        let rebuilt = from_stored(&stored).unwrap();
        assert_eq!(rebuilt.as_dynamic().unwrap().current_value, tuned_value);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let stored = StoredFilter {
            kind: "mystery".to_string(),
            config: serde_json::json!({}),
        };
        assert!(matches!(
            from_stored(&stored),
            Err(CoreError::UnknownFilterKind(_))
        ));
    }

    #[test]
    fn team_without_name_is_an_error() {
        let stored = StoredFilter {
            kind: "team".to_string(),
            config: serde_json::json!({}),
        };
        assert!(matches!(
            from_stored(&stored),
            Err(CoreError::BadFilterConfig { .. })
        ));
    }
}
