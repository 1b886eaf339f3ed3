//! Configuration for the grid builder.

/// Knobs for one grid build.
///
/// The result band `[min_results, max_results]` is the playability target:
/// every grid cell should have at least `min_results` correct answers (not
/// impossible) and at most `max_results` (not trivial).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lower bound of the acceptable per-cell answer count.
    /// Default: `5`
    pub min_results: usize,

    /// Upper bound of the acceptable per-cell answer count.
    /// Default: `40`
    pub max_results: usize,

    /// Adjustment steps allowed per dynamic filter before it is discarded.
    /// Default: `20`
    pub max_tuning_attempts: usize,

    /// Outer grid attempts before the build fails.
    /// Default: `10`
    pub num_iterations: usize,

    /// Grid rows; fixed by the 3×3 shape.
    pub num_statics: usize,

    /// Grid columns; fixed by the 3×3 shape.
    pub num_dynamics: usize,

    /// Usage-weighting window in days.
    /// Default: `7`
    pub lookback_days: i64,

    /// Sub-window that attracts the strong recency penalty.
    /// Default: `2`
    pub very_recent_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_results: 5,
            max_results: 40,
            max_tuning_attempts: 20,
            num_iterations: 10,
            num_statics: 3,
            num_dynamics: 3,
            lookback_days: 7,
            very_recent_days: 2,
        }
    }
}

impl EngineConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// | Variable                       | Default |
    /// |--------------------------------|---------|
    /// | `HOOPGRID_MIN_RESULTS`         | `5`     |
    /// | `HOOPGRID_MAX_RESULTS`         | `40`    |
    /// | `HOOPGRID_MAX_TUNING_ATTEMPTS` | `20`    |
    /// | `HOOPGRID_NUM_ITERATIONS`      | `10`    |
    /// | `HOOPGRID_LOOKBACK_DAYS`       | `7`     |
    /// | `HOOPGRID_VERY_RECENT_DAYS`    | `2`     |
    ///
    /// The grid shape (3 statics, 3 dynamics) is not configurable.
    pub fn from_env() -> Self {
        fn env_usize(key: &str, default: usize) -> usize {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        }
        fn env_i64(key: &str, default: i64) -> i64 {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        }

        Self {
            min_results: env_usize("HOOPGRID_MIN_RESULTS", 5),
            max_results: env_usize("HOOPGRID_MAX_RESULTS", 40),
            max_tuning_attempts: env_usize("HOOPGRID_MAX_TUNING_ATTEMPTS", 20),
            num_iterations: env_usize("HOOPGRID_NUM_ITERATIONS", 10),
            num_statics: 3,
            num_dynamics: 3,
            lookback_days: env_i64("HOOPGRID_LOOKBACK_DAYS", 7),
            very_recent_days: env_i64("HOOPGRID_VERY_RECENT_DAYS", 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_band() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.min_results, 5);
        assert_eq!(cfg.max_results, 40);
    }

    #[test]
    fn default_budgets() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.max_tuning_attempts, 20);
        assert_eq!(cfg.num_iterations, 10);
    }

    #[test]
    fn grid_shape_is_three_by_three() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.num_statics, 3);
        assert_eq!(cfg.num_dynamics, 3);
    }

    /// Env-var scenarios share one test function to avoid races from
    /// parallel test execution (env vars are process-global).
    #[test]
    fn from_env_all_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        // Defaults when nothing is set
        std::env::remove_var("HOOPGRID_MIN_RESULTS");
        std::env::remove_var("HOOPGRID_MAX_RESULTS");
        std::env::remove_var("HOOPGRID_NUM_ITERATIONS");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.min_results, 5);
        assert_eq!(cfg.max_results, 40);

        // Custom values
        std::env::set_var("HOOPGRID_MIN_RESULTS", "3");
        std::env::set_var("HOOPGRID_MAX_RESULTS", "60");
        std::env::set_var("HOOPGRID_NUM_ITERATIONS", "4");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.min_results, 3);
        assert_eq!(cfg.max_results, 60);
        assert_eq!(cfg.num_iterations, 4);

        // Invalid values fall back to defaults
        std::env::set_var("HOOPGRID_MIN_RESULTS", "not_a_number");
        let cfg = EngineConfig::from_env();
        assert_eq!(cfg.min_results, 5);

        std::env::remove_var("HOOPGRID_MIN_RESULTS");
        std::env::remove_var("HOOPGRID_MAX_RESULTS");
        std::env::remove_var("HOOPGRID_NUM_ITERATIONS");
    }
}
