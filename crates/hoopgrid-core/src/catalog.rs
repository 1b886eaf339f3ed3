//! The full inventory of filters available to the grid builder.
//!
//! Both catalog functions are pure for a given `(pool, seed)` pair: every
//! random decision draws from a locally-scoped [`StdRng`] keyed on the seed,
//! never from shared global state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::filter::{Comparison, DynamicConfig, DynamicFilter, GameFilter, StaticFilter};
use crate::player::{PlayerPool, StatField};

/// Minimum players sharing a last-name initial for it to be pickable.
pub const MIN_INITIAL_MATCHES: usize = 10;
/// Fallbacks for construction against an empty pool (cold start, unit tests).
const FALLBACK_TEAM: &str = "Boston Celtics";
const FALLBACK_INITIAL: char = 'J';

// ─────────────────────────────────────────────
// Static catalog
// ─────────────────────────────────────────────

/// Every static filter available for grid rows.
///
/// `Team`, `Position` and `LastInitial` pick their value here, seeded; the
/// pool-derived picks fall back to a fixed value when the pool is empty.
pub fn static_filters(pool: &PlayerPool, seed: u64) -> Vec<GameFilter> {
    let mut rng = StdRng::seed_from_u64(seed);
    vec![
        GameFilter::Static(StaticFilter::UsaBorn),
        GameFilter::Static(StaticFilter::International),
        GameFilter::Static(StaticFilter::AllLeague),
        GameFilter::Static(StaticFilter::AllDefensive),
        GameFilter::Static(StaticFilter::AllRookie),
        GameFilter::Static(StaticFilter::Champion),
        GameFilter::Static(StaticFilter::AllStar),
        GameFilter::Static(StaticFilter::OlympicMedalist),
        GameFilter::Static(StaticFilter::TopDraftPick),
        GameFilter::Static(random_team(pool, &mut rng)),
        GameFilter::Static(random_position(&mut rng)),
        GameFilter::Static(random_initial(pool, &mut rng)),
    ]
}

fn random_team(pool: &PlayerPool, rng: &mut StdRng) -> StaticFilter {
    let teams = pool.team_names();
    let name = if teams.is_empty() {
        tracing::debug!("empty pool, team filter falls back to {FALLBACK_TEAM}");
        FALLBACK_TEAM.to_string()
    } else {
        teams[rng.gen_range(0..teams.len())].clone()
    };
    StaticFilter::Team { name }
}

fn random_position(rng: &mut StdRng) -> StaticFilter {
    const ROLES: [&str; 3] = ["Guard", "Forward", "Center"];
    StaticFilter::Position {
        role: ROLES[rng.gen_range(0..ROLES.len())].to_string(),
    }
}

fn random_initial(pool: &PlayerPool, rng: &mut StdRng) -> StaticFilter {
    let initials = pool.initials_with_at_least(MIN_INITIAL_MATCHES);
    let letter = if initials.is_empty() {
        tracing::debug!("no initial has {MIN_INITIAL_MATCHES}+ players, falling back to {FALLBACK_INITIAL}");
        FALLBACK_INITIAL
    } else {
        initials[rng.gen_range(0..initials.len())]
    };
    StaticFilter::LastInitial { letter }
}

// ─────────────────────────────────────────────
// Dynamic catalog
// ─────────────────────────────────────────────

/// Every dynamic filter available for grid columns, each with a seeded
/// initial threshold.
pub fn dynamic_filters(seed: u64) -> Vec<GameFilter> {
    let mut rng = StdRng::seed_from_u64(seed);
    dynamic_configs()
        .into_iter()
        .map(|config| GameFilter::Dynamic(DynamicFilter::fresh(config, &mut rng)))
        .collect()
}

fn dynamic_configs() -> Vec<DynamicConfig> {
    vec![
        config(
            StatField::BaseSalary,
            Comparison::Higher,
            "Salary more than",
            Some("Salary:"),
            Some("M USD"),
            "Selects players with a base salary of at least the given amount for the current season.",
            (20_000_000, 40_000_000, 5_000_000),
            5_000_000,
        ),
        config(
            StatField::CareerPpg,
            Comparison::Higher,
            "Career points per game:",
            None,
            None,
            "Selects players who averaged at least a certain number of points per game. Only regular season games count.",
            (18, 22, 2),
            2,
        ),
        config(
            StatField::CareerRpg,
            Comparison::Higher,
            "Career rebounds per game:",
            None,
            None,
            "Selects players who averaged at least a certain number of rebounds per game. Only regular season games count.",
            (6, 8, 1),
            1,
        ),
        config(
            StatField::CareerApg,
            Comparison::Higher,
            "Career assists per game:",
            None,
            None,
            "Selects players who averaged at least a certain number of assists per game. Only regular season games count.",
            (4, 5, 1),
            1,
        ),
        config(
            StatField::CareerGp,
            Comparison::Higher,
            "Career games played:",
            None,
            None,
            "Selects players who appeared in at least a certain number of regular season games.",
            (500, 600, 50),
            50,
        ),
        config(
            StatField::NumSeasons,
            Comparison::Higher,
            "More than",
            Some("Total seasons:"),
            Some("seasons"),
            "Selects players credited with at least a certain number of seasons. Appearing in one game credits the season.",
            (9, 11, 1),
            1,
        ),
        config(
            StatField::NumSeasons,
            Comparison::Lower,
            "No more than",
            Some("Total seasons:"),
            Some("seasons"),
            "Selects players credited with at most a certain number of seasons.",
            (1, 3, 1),
            1,
        ),
        config(
            StatField::HeightCm,
            Comparison::Higher,
            "Taller than",
            Some("Height:"),
            Some("cm"),
            "Selects players taller than a certain height in centimeters.",
            (200, 210, 5),
            5,
        ),
        config(
            StatField::HeightCm,
            Comparison::Lower,
            "Smaller than",
            Some("Height:"),
            Some("cm"),
            "Selects players shorter than a certain height in centimeters.",
            (190, 195, 5),
            5,
        ),
        config(
            StatField::CareerHighPts,
            Comparison::Higher,
            "Career high points:",
            None,
            None,
            "Selects players who scored at least a certain number of points in a single game, regular season or playoffs.",
            (40, 55, 5),
            5,
        ),
        config(
            StatField::CareerHighReb,
            Comparison::Higher,
            "Career high rebounds:",
            None,
            None,
            "Selects players who grabbed at least a certain number of rebounds in a single game.",
            (15, 20, 5),
            5,
        ),
        config(
            StatField::CareerHighAst,
            Comparison::Higher,
            "Career high assists:",
            None,
            None,
            "Selects players who dealt at least a certain number of assists in a single game.",
            (15, 17, 5),
            5,
        ),
        config(
            StatField::CareerHighStl,
            Comparison::Higher,
            "Career high steals:",
            None,
            None,
            "Selects players who collected at least a certain number of steals in a single game.",
            (5, 7, 1),
            1,
        ),
        config(
            StatField::CareerHighBlk,
            Comparison::Higher,
            "Career high blocks:",
            None,
            None,
            "Selects players who blocked at least a certain number of shots in a single game.",
            (5, 7, 1),
            1,
        ),
        config(
            StatField::TeamsPlayedFor,
            Comparison::Higher,
            "Teams played for:",
            None,
            None,
            "Selects players who appeared for at least a certain number of franchises.",
            (5, 7, 1),
            1,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn config(
    field: StatField,
    comparison: Comparison,
    description: &str,
    stats_desc: Option<&str>,
    unit: Option<&str>,
    detailed: &str,
    (min, max, step): (i64, i64, i64),
    adjust_step: i64,
) -> DynamicConfig {
    DynamicConfig {
        field,
        comparison,
        description: description.to_string(),
        stats_desc: stats_desc.map(str::to_string),
        unit: unit.map(str::to_string),
        detailed_desc: Some(detailed.to_string()),
        initial_min: Some(min),
        initial_max: Some(max),
        initial_step: Some(step),
        widen_step: adjust_step,
        narrow_step: adjust_step,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
