use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// StatField
// ─────────────────────────────────────────────

/// Numeric player attribute a [`crate::filter::DynamicFilter`] can threshold on.
///
/// The snake_case serde names double as the stable field keys used in
/// persisted filter configs and in type descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    BaseSalary,
    CareerPpg,
    CareerRpg,
    CareerApg,
    CareerGp,
    NumSeasons,
    HeightCm,
    CareerHighPts,
    CareerHighReb,
    CareerHighAst,
    CareerHighStl,
    CareerHighBlk,
    TeamsPlayedFor,
}

impl StatField {
    /// Stable key used in type descriptors and log lines.
    pub fn key(&self) -> &'static str {
        match self {
            Self::BaseSalary => "base_salary",
            Self::CareerPpg => "career_ppg",
            Self::CareerRpg => "career_rpg",
            Self::CareerApg => "career_apg",
            Self::CareerGp => "career_gp",
            Self::NumSeasons => "num_seasons",
            Self::HeightCm => "height_cm",
            Self::CareerHighPts => "career_high_pts",
            Self::CareerHighReb => "career_high_reb",
            Self::CareerHighAst => "career_high_ast",
            Self::CareerHighStl => "career_high_stl",
            Self::CareerHighBlk => "career_high_blk",
            Self::TeamsPlayedFor => "teams_played_for",
        }
    }

    /// Per-game averages carry one decimal in display; everything else is integral.
    pub fn is_fractional(&self) -> bool {
        matches!(self, Self::CareerPpg | Self::CareerRpg | Self::CareerApg)
    }
}

// ─────────────────────────────────────────────
// Player
// ─────────────────────────────────────────────

/// A read-only player record from the underlying dataset.
///
/// Filters only ever read from it; all mutation happens upstream in the
/// data-sync jobs, which are not part of this workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Player {
    /// Primary key from the external stats provider.
    pub stats_id: u32,
    pub name: String,
    pub country: String,
    /// May list several roles, e.g. `"Guard, Forward"`.
    pub position: String,
    /// Franchise names the player appeared in at least one game for.
    pub teams: Vec<String>,

    pub draft_year: u16,
    pub draft_number: u16,
    pub is_undrafted: bool,

    pub is_award_all_league_first: bool,
    pub is_award_all_league_second: bool,
    pub is_award_all_league_third: bool,
    pub is_award_all_defensive: bool,
    pub is_award_all_rookie: bool,
    pub is_award_champ: bool,
    pub is_award_all_star: bool,
    pub is_award_olympic_gold: bool,
    pub is_award_olympic_silver: bool,
    pub is_award_olympic_bronze: bool,

    pub base_salary: i64,
    pub career_ppg: f64,
    pub career_rpg: f64,
    pub career_apg: f64,
    pub career_gp: i64,
    pub num_seasons: i64,
    pub height_cm: i64,
    pub career_high_pts: i64,
    pub career_high_reb: i64,
    pub career_high_ast: i64,
    pub career_high_stl: i64,
    pub career_high_blk: i64,
}

impl Player {
    /// Uniform numeric accessor used by dynamic filters.
    pub fn stat(&self, field: StatField) -> f64 {
        match field {
            StatField::BaseSalary => self.base_salary as f64,
            StatField::CareerPpg => self.career_ppg,
            StatField::CareerRpg => self.career_rpg,
            StatField::CareerApg => self.career_apg,
            StatField::CareerGp => self.career_gp as f64,
            StatField::NumSeasons => self.num_seasons as f64,
            StatField::HeightCm => self.height_cm as f64,
            StatField::CareerHighPts => self.career_high_pts as f64,
            StatField::CareerHighReb => self.career_high_reb as f64,
            StatField::CareerHighAst => self.career_high_ast as f64,
            StatField::CareerHighStl => self.career_high_stl as f64,
            StatField::CareerHighBlk => self.career_high_blk as f64,
            StatField::TeamsPlayedFor => self.teams.len() as f64,
        }
    }

    /// Whether the player ever appeared for the named franchise.
    pub fn played_for(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }

    /// Uppercased first letter of the last name, if any.
    pub fn last_initial(&self) -> Option<char> {
        self.name
            .rsplit(' ')
            .next()
            .and_then(|last| last.chars().next())
            .map(|c| c.to_ascii_uppercase())
    }
}

// ─────────────────────────────────────────────
// PlayerPool
// ─────────────────────────────────────────────

/// The queryable player collection the grid engine runs against.
///
/// Owns the records; filter evaluation borrows. The engine only ever needs
/// three capabilities: filter, count, and point lookup by `stats_id`.
#[derive(Debug, Default)]
pub struct PlayerPool {
    players: Vec<Player>,
    by_id: HashMap<u32, usize>,
}

impl PlayerPool {
    pub fn new(players: Vec<Player>) -> Self {
        let by_id = players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.stats_id, i))
            .collect();
        Self { players, by_id }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Borrowed view over every player, the starting collection for filtering.
    pub fn all(&self) -> Vec<&Player> {
        self.players.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Point lookup by primary key.
    pub fn get(&self, stats_id: u32) -> Option<&Player> {
        self.by_id.get(&stats_id).map(|&i| &self.players[i])
    }

    /// Distinct franchise names that have at least one player in the pool,
    /// sorted for deterministic iteration.
    pub fn team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .players
            .iter()
            .flat_map(|p| p.teams.iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Last-name initials with at least `min_count` players, sorted.
    pub fn initials_with_at_least(&self, min_count: usize) -> Vec<char> {
        let mut counts: HashMap<char, usize> = HashMap::new();
        for p in &self.players {
            if let Some(c) = p.last_initial() {
                *counts.entry(c).or_insert(0) += 1;
            }
        }
        let mut initials: Vec<char> = counts
            .into_iter()
            .filter(|(_, n)| *n >= min_count)
            .map(|(c, _)| c)
            .collect();
        initials.sort();
        initials
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32, name: &str) -> Player {
        Player {
            stats_id: id,
            name: name.to_string(),
            ..Player::default()
        }
    }

    #[test]
    fn stat_accessor_covers_every_field() {
        let p = Player {
            base_salary: 30_000_000,
            career_ppg: 25.1,
            career_gp: 800,
            teams: vec!["Boston Celtics".into(), "Miami Heat".into()],
            ..Player::default()
        };
        assert_eq!(p.stat(StatField::BaseSalary), 30_000_000.0);
        assert!((p.stat(StatField::CareerPpg) - 25.1).abs() < 1e-9);
        assert_eq!(p.stat(StatField::CareerGp), 800.0);
        assert_eq!(p.stat(StatField::TeamsPlayedFor), 2.0);
    }

    #[test]
    fn last_initial_uses_last_name() {
        let p = player(1, "LeBron James");
        assert_eq!(p.last_initial(), Some('J'));

        let lower = player(2, "luka doncic");
        assert_eq!(lower.last_initial(), Some('D'));

        let empty = player(3, "");
        assert_eq!(empty.last_initial(), None);
    }

    #[test]
    fn pool_point_lookup() {
        let pool = PlayerPool::new(vec![player(7, "A"), player(9, "B")]);
        assert_eq!(pool.get(9).unwrap().name, "B");
        assert!(pool.get(8).is_none());
    }

    #[test]
    fn team_names_are_distinct_and_sorted() {
        let mut a = player(1, "A");
        a.teams = vec!["Miami Heat".into(), "Boston Celtics".into()];
        let mut b = player(2, "B");
        b.teams = vec!["Miami Heat".into()];
        let pool = PlayerPool::new(vec![a, b]);
        assert_eq!(pool.team_names(), vec!["Boston Celtics", "Miami Heat"]);
    }

    #[test]
    fn initials_respect_min_count() {
        let pool = PlayerPool::new(vec![
            player(1, "Al Adams"),
            player(2, "Bo Avery"),
            player(3, "Cy Brown"),
        ]);
        assert_eq!(pool.initials_with_at_least(2), vec!['A']);
        assert!(pool.initials_with_at_least(3).is_empty());
    }

    #[test]
    fn stat_field_keys_are_snake_case() {
        assert_eq!(StatField::CareerPpg.key(), "career_ppg");
        let json = serde_json::to_string(&StatField::CareerHighPts).unwrap();
        assert_eq!(json, "\"career_high_pts\"");
    }
}
