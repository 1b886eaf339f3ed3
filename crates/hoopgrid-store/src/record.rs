use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ─────────────────────────────────────────────
// FilterRole / FilterRecord
// ─────────────────────────────────────────────

/// Whether a persisted filter is a grid row (static) or column (dynamic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterRole {
    Static,
    Dynamic,
}

impl FilterRole {
    /// Stable key segment; also used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
        }
    }
}

/// One persisted filter of a daily grid.
///
/// Exactly three records per role exist for a complete date; (date, role,
/// slot) is unique. `kind` + `config` are the registry tag and flat JSON
/// config the core crate reconstructs filters from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRecord {
    pub date: NaiveDate,
    pub role: FilterRole,
    /// Row/column position, 0..=2.
    pub slot: u8,
    pub kind: String,
    pub config: JsonValue,
}

// ─────────────────────────────────────────────
// GridSummary
// ─────────────────────────────────────────────

/// How the grid for a date came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Freshly tuned by the grid builder.
    Fresh,
    /// Copied from an earlier date because generation failed — degraded mode.
    Reused,
}

/// Derived per-cell answer counts, stored alongside the filters for
/// downstream difficulty display. Never feeds back into tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    pub date: NaiveDate,
    /// `"<static_slot>_<dynamic_slot>"` → number of matching players.
    pub cells: BTreeMap<String, u32>,
    pub mode: GenerationMode,
}

impl GridSummary {
    pub fn cell_key(static_slot: usize, dynamic_slot: usize) -> String {
        format!("{static_slot}_{dynamic_slot}")
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serde_round_trip() {
        let record = FilterRecord {
            date: NaiveDate::from_ymd_opt(2026, 8, 4).unwrap(),
            role: FilterRole::Dynamic,
            slot: 1,
            kind: "dynamic".to_string(),
            config: serde_json::json!({ "field": "career_ppg", "current_value": 20 }),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"2026-08-04\""));
        assert!(json.contains("\"dynamic\""));
        let parsed: FilterRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn summary_cell_keys() {
        assert_eq!(GridSummary::cell_key(0, 2), "0_2");
    }
}
