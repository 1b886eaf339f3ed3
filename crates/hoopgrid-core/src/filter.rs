//! The closed filter sum type the grid is built from.
//!
//! Two kinds of filter exist and the distinction is a property of the
//! variant, not a class hierarchy:
//! - [`StaticFilter`] — fixed criteria (awards, birthplace, team, …); used
//!   as grid rows.
//! - [`DynamicFilter`] — a numeric threshold over a [`StatField`] with a
//!   comparison direction; used as grid columns and adjusted by the tuning
//!   engine via [`DynamicFilter::widen`] / [`DynamicFilter::narrow`].
//!
//! All filters are pure attribute predicates: applying A then B returns the
//! same subset as B then A.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::player::{Player, StatField};

// ─────────────────────────────────────────────
// Comparison
// ─────────────────────────────────────────────

/// Direction of a dynamic threshold: at least (`higher`) or at most (`lower`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    #[default]
    Higher,
    Lower,
}

// ─────────────────────────────────────────────
// DynamicConfig / DynamicFilter
// ─────────────────────────────────────────────

fn default_step() -> i64 {
    1
}

/// Tunable-threshold filter configuration.
///
/// `initial_min` / `initial_max` double as the legal value range: the live
/// threshold is clamped back into it after every adjustment so the puzzle
/// stays in an interesting regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicConfig {
    pub field: StatField,
    #[serde(default)]
    pub comparison: Comparison,
    pub description: String,
    /// Label used when rendering a player's own value; defaults to `description`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_step: Option<i64>,
    #[serde(default = "default_step")]
    pub widen_step: i64,
    #[serde(default = "default_step")]
    pub narrow_step: i64,
}

/// A dynamic filter: configuration plus the live threshold.
///
/// The serialized form carries `current_value` alongside the config fields so
/// a reconstructed filter resumes at the exact tuned threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicFilter {
    #[serde(flatten)]
    pub config: DynamicConfig,
    pub current_value: i64,
}

impl DynamicFilter {
    /// Construct with a randomized initial threshold.
    ///
    /// Draws from the stepped range when `initial_step` is set, from a
    /// uniform integer range when only the bounds are, and defaults to 0
    /// otherwise.
    pub fn fresh(config: DynamicConfig, rng: &mut StdRng) -> Self {
        let current_value = match (config.initial_min, config.initial_max) {
            (Some(min), Some(max)) => match config.initial_step {
                Some(step) if step > 0 && max > min => {
                    let count = ((max - min) + step - 1) / step;
                    min + step * rng.gen_range(0..count)
                }
                _ => rng.gen_range(min..=max.max(min)),
            },
            _ => 0,
        };
        Self { config, current_value }
    }

    pub fn matches(&self, player: &Player) -> bool {
        let value = player.stat(self.config.field);
        match self.config.comparison {
            Comparison::Higher => value >= self.current_value as f64,
            Comparison::Lower => value <= self.current_value as f64,
        }
    }

    /// Make the filter match MORE players.
    ///
    /// For `Higher` thresholds the value decreases; for `Lower` it increases.
    pub fn widen(&mut self) {
        let step = match self.config.comparison {
            Comparison::Higher => -self.config.widen_step,
            Comparison::Lower => self.config.widen_step,
        };
        self.current_value += step;
        self.clamp();
    }

    /// Make the filter match FEWER players. Inverse of [`widen`](Self::widen).
    pub fn narrow(&mut self) {
        let step = match self.config.comparison {
            Comparison::Higher => self.config.narrow_step,
            Comparison::Lower => -self.config.narrow_step,
        };
        self.current_value += step;
        self.clamp();
    }

    // Keeps the threshold inside the configured legal range.
    fn clamp(&mut self) {
        if let Some(min) = self.config.initial_min {
            if self.current_value < min {
                self.current_value = min;
            }
        }
        if let Some(max) = self.config.initial_max {
            if self.current_value > max {
                self.current_value = max;
            }
        }
    }

    pub fn short_desc(&self) -> String {
        let operator = match self.config.comparison {
            Comparison::Higher => '+',
            Comparison::Lower => '-',
        };
        let unit = self
            .config
            .unit
            .as_deref()
            .map(|u| format!(" {u}"))
            .unwrap_or_default();
        format!(
            "{} {}{}{}",
            self.config.description,
            fmt_display_value(self.current_value as f64, false),
            operator,
            unit
        )
    }

    pub fn long_desc(&self) -> String {
        self.config
            .detailed_desc
            .clone()
            .unwrap_or_else(|| self.short_desc())
    }

    pub fn player_stat_str(&self, player: &Player) -> String {
        let label = self
            .config
            .stats_desc
            .as_deref()
            .unwrap_or(&self.config.description);
        let unit = self
            .config
            .unit
            .as_deref()
            .map(|u| format!(" {u}"))
            .unwrap_or_default();
        let value = player.stat(self.config.field);
        format!(
            "{} {}{}",
            label,
            fmt_display_value(value, self.config.field.is_fractional()),
            unit
        )
    }

    /// Stable identity for usage weighting: same field + direction ⇒ same
    /// type, whatever the current threshold.
    pub fn type_descriptor(&self) -> String {
        let direction = match self.config.comparison {
            Comparison::Higher => "higher",
            Comparison::Lower => "lower",
        };
        format!("dynamic_{}_{}", self.config.field.key(), direction)
    }
}

/// Values above one million render abbreviated with one decimal (pure
/// presentation; the salary unit label supplies the "M").
fn fmt_display_value(value: f64, fractional: bool) -> String {
    if value > 1_000_000.0 {
        format!("{:.1}", value / 1_000_000.0)
    } else if fractional {
        format!("{value:.1}")
    } else {
        format!("{}", value as i64)
    }
}

// ─────────────────────────────────────────────
// StaticFilter
// ─────────────────────────────────────────────

/// Fixed-criteria filters. The award and birthplace variants are parameterless;
/// `Team`, `Position` and `LastInitial` carry the value picked at catalog time.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticFilter {
    UsaBorn,
    International,
    AllLeague,
    AllDefensive,
    AllRookie,
    Champion,
    AllStar,
    OlympicMedalist,
    TopDraftPick,
    Team { name: String },
    Position { role: String },
    LastInitial { letter: char },
}

impl StaticFilter {
    /// Stable class tag; also the registry key in persisted records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsaBorn => "usa_born",
            Self::International => "international",
            Self::AllLeague => "all_league",
            Self::AllDefensive => "all_defensive",
            Self::AllRookie => "all_rookie",
            Self::Champion => "champion",
            Self::AllStar => "all_star",
            Self::OlympicMedalist => "olympic_medalist",
            Self::TopDraftPick => "top_draft_pick",
            Self::Team { .. } => "team",
            Self::Position { .. } => "position",
            Self::LastInitial { .. } => "last_initial",
        }
    }

    pub fn matches(&self, p: &Player) -> bool {
        match self {
            Self::UsaBorn => p.country == "USA",
            Self::International => p.country != "USA",
            Self::AllLeague => {
                p.is_award_all_league_first
                    || p.is_award_all_league_second
                    || p.is_award_all_league_third
            }
            Self::AllDefensive => p.is_award_all_defensive,
            Self::AllRookie => p.is_award_all_rookie,
            Self::Champion => p.is_award_champ,
            Self::AllStar => p.is_award_all_star,
            Self::OlympicMedalist => {
                p.is_award_olympic_gold || p.is_award_olympic_silver || p.is_award_olympic_bronze
            }
            // Undrafted players carry a meaningless draft_number; exclude first.
            Self::TopDraftPick => !p.is_undrafted && p.draft_number <= 10,
            Self::Team { name } => p.played_for(name),
            Self::Position { role } => p.position.contains(role.as_str()),
            Self::LastInitial { letter } => p.last_initial() == Some(*letter),
        }
    }

    pub fn short_desc(&self) -> String {
        match self {
            Self::UsaBorn => "Born in USA".to_string(),
            Self::International => "Born outside of USA".to_string(),
            Self::AllLeague => "All-League player".to_string(),
            Self::AllDefensive => "All-Defensive player".to_string(),
            Self::AllRookie => "All-Rookie player".to_string(),
            Self::Champion => "League Champion".to_string(),
            Self::AllStar => "All-Star player".to_string(),
            Self::OlympicMedalist => "Olympic medalist".to_string(),
            Self::TopDraftPick => "Top 10 Draft Pick".to_string(),
            Self::Team { name } => format!("Played for {name}"),
            Self::Position { role } => format!("Plays {role} position"),
            Self::LastInitial { letter } => format!("Last name starts with {letter}"),
        }
    }

    pub fn long_desc(&self) -> String {
        match self {
            Self::UsaBorn => {
                "Selects players who were born in the United States of America. \
                 Players born in U.S. territories count as international players."
                    .to_string()
            }
            Self::International => {
                "Selects players who were born outside the USA, including players \
                 born in U.S. territories."
                    .to_string()
            }
            Self::AllLeague => {
                "Selects players named to at least one All-League team (first, \
                 second or third) during their career."
                    .to_string()
            }
            Self::AllDefensive => {
                "Selects players named to at least one All-Defensive team during \
                 their career."
                    .to_string()
            }
            Self::AllRookie => {
                "Selects players named to an All-Rookie team in their debut season."
                    .to_string()
            }
            Self::Champion => {
                "Selects players who were on the roster of a championship-winning \
                 team, regardless of their role during the title run."
                    .to_string()
            }
            Self::AllStar => {
                "Selects players chosen for at least one All-Star game, by any \
                 selection method."
                    .to_string()
            }
            Self::OlympicMedalist => {
                "Selects players who won an Olympic medal (gold, silver or bronze) \
                 representing any country."
                    .to_string()
            }
            Self::TopDraftPick => {
                "Selects players chosen within the top 10 picks of any draft. \
                 Later picks and undrafted players are excluded."
                    .to_string()
            }
            Self::Team { name } => format!(
                "Selects players who appeared in at least one game for the {name} \
                 at any point in their career."
            ),
            Self::Position { role } => format!(
                "Selects players listed as {role}s. Players listed with multiple \
                 positions match if any of them is {role}."
            ),
            Self::LastInitial { letter } => format!(
                "Selects players whose last name starts with the letter {letter}."
            ),
        }
    }

    pub fn player_stat_str(&self, p: &Player) -> String {
        match self {
            Self::UsaBorn | Self::International => format!("Birthplace: {}", p.country),
            Self::AllLeague => format!("All-League: {}", self.matches(p)),
            Self::AllDefensive => format!("All-Defensive: {}", p.is_award_all_defensive),
            Self::AllRookie => format!("All-Rookie: {}", p.is_award_all_rookie),
            Self::Champion => format!("Champion: {}", p.is_award_champ),
            Self::AllStar => format!("All-Star: {}", p.is_award_all_star),
            Self::OlympicMedalist => format!("Olympic medal: {}", self.matches(p)),
            Self::TopDraftPick => {
                if p.is_undrafted {
                    "Draft pick: undrafted".to_string()
                } else {
                    format!("Draft pick: #{} in {}", p.draft_number, p.draft_year)
                }
            }
            Self::Team { .. } => format!("Teams: {}", p.teams.join(", ")),
            Self::Position { .. } => format!("Position: {}", p.position),
            Self::LastInitial { .. } => format!("Name: {}", p.name),
        }
    }
}

// ─────────────────────────────────────────────
// GameFilter
// ─────────────────────────────────────────────

/// A filter usable as a grid row or column.
#[derive(Debug, Clone, PartialEq)]
pub enum GameFilter {
    Static(StaticFilter),
    Dynamic(DynamicFilter),
}

impl GameFilter {
    pub fn matches(&self, player: &Player) -> bool {
        match self {
            Self::Static(f) => f.matches(player),
            Self::Dynamic(f) => f.matches(player),
        }
    }

    /// Apply to a borrowed collection, returning the matching subset.
    /// Pure and order-independent under composition.
    pub fn apply<'a>(&self, players: &[&'a Player]) -> Vec<&'a Player> {
        players
            .iter()
            .copied()
            .filter(|p| self.matches(p))
            .collect()
    }

    pub fn short_desc(&self) -> String {
        match self {
            Self::Static(f) => f.short_desc(),
            Self::Dynamic(f) => f.short_desc(),
        }
    }

    pub fn long_desc(&self) -> String {
        match self {
            Self::Static(f) => f.long_desc(),
            Self::Dynamic(f) => f.long_desc(),
        }
    }

    pub fn player_stat_str(&self, player: &Player) -> String {
        match self {
            Self::Static(f) => f.player_stat_str(player),
            Self::Dynamic(f) => f.player_stat_str(player),
        }
    }

    /// Registry tag of the underlying kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static(f) => f.kind(),
            Self::Dynamic(_) => "dynamic",
        }
    }

    /// Stable identity used for historical-usage weighting.
    ///
    /// Static filters are identified by their class tag; dynamic filters by
    /// field and direction, so two thresholds over different stats are
    /// different types even though they share an implementation.
    pub fn type_descriptor(&self) -> String {
        match self {
            Self::Static(f) => f.kind().to_string(),
            Self::Dynamic(f) => f.type_descriptor(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }

    /// Mutable access to the tunable variant; `None` for static filters.
    pub fn as_dynamic_mut(&mut self) -> Option<&mut DynamicFilter> {
        match self {
            Self::Dynamic(f) => Some(f),
            Self::Static(_) => None,
        }
    }

    pub fn as_dynamic(&self) -> Option<&DynamicFilter> {
        match self {
            Self::Dynamic(f) => Some(f),
            Self::Static(_) => None,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
