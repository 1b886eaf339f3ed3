//! The adaptive narrow/widen loop for one dynamic filter.
//!
//! ## Step protocol
//!
//! 1. **Evaluate** — count the intersection with every static row.
//! 2. **Classify**:
//!    - some counts above the band AND some below ⇒ no single threshold can
//!      satisfy all rows ⇒ fail immediately (`OutOfRange`), no adjustment
//!    - any count above ⇒ narrow; if the previous step widened, the filter
//!      is bouncing between directions ⇒ fail (`Oscillating`)
//!    - any count below ⇒ widen, with the mirrored oscillation check
//!    - everything inside the band ⇒ done
//! 3. **Repeat** up to `max_tuning_attempts` steps.
//!
//! Failures are per-candidate: the grid builder discards the filter and
//! falls through to the next one in its weighted order.

use hoopgrid_core::{DynamicFilter, GameFilter, PlayerPool};

use crate::config::EngineConfig;

// ─────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────

/// Direction of the most recent threshold adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Narrowed,
    Widened,
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuneFailure {
    /// Pairings sit on both sides of the band at once.
    OutOfRange,
    /// Adjustment direction reversed without converging.
    Oscillating,
    /// The step budget ran out before every pairing entered the band.
    AttemptsExhausted,
}

// ─────────────────────────────────────────────
// Tuning
// ─────────────────────────────────────────────

/// Number of players matching both filters — one grid cell's answer count.
pub fn cell_count(row: &GameFilter, column: &GameFilter, pool: &PlayerPool) -> usize {
    pool.iter()
        .filter(|p| column.matches(p) && row.matches(p))
        .count()
}

/// Adjust `dynamic` until every pairing with `rows` lands inside the
/// configured result band, or give up.
pub fn tune(
    dynamic: &mut DynamicFilter,
    rows: &[GameFilter],
    pool: &PlayerPool,
    cfg: &EngineConfig,
) -> Result<(), TuneFailure> {
    let mut last_action: Option<Action> = None;

    for _ in 0..cfg.max_tuning_attempts {
        let counts = pairing_counts(dynamic, rows, pool);
        for (row, count) in rows.iter().zip(&counts) {
            tracing::debug!(
                "filter [{}] x [{}] returned {count} results",
                row.short_desc(),
                dynamic.short_desc()
            );
        }

        let any_high = counts.iter().any(|&n| n > cfg.max_results);
        let any_low = counts.iter().any(|&n| n < cfg.min_results);

        if any_high && any_low {
            tracing::debug!(
                "filter [{}] returned results out of range",
                dynamic.short_desc()
            );
            return Err(TuneFailure::OutOfRange);
        }

        if any_high {
            if last_action == Some(Action::Widened) {
                tracing::debug!("filter [{}] is oscillating, giving up", dynamic.short_desc());
                return Err(TuneFailure::Oscillating);
            }
            dynamic.narrow();
            tracing::debug!("narrowed filter to [{}]", dynamic.short_desc());
            last_action = Some(Action::Narrowed);
        } else if any_low {
            if last_action == Some(Action::Narrowed) {
                tracing::debug!("filter [{}] is oscillating, giving up", dynamic.short_desc());
                return Err(TuneFailure::Oscillating);
            }
            dynamic.widen();
            tracing::debug!("widened filter to [{}]", dynamic.short_desc());
            last_action = Some(Action::Widened);
        } else {
            return Ok(());
        }
    }

    Err(TuneFailure::AttemptsExhausted)
}

fn pairing_counts(dynamic: &DynamicFilter, rows: &[GameFilter], pool: &PlayerPool) -> Vec<usize> {
    rows.iter()
        .map(|row| {
            pool.iter()
                .filter(|p| dynamic.matches(p) && row.matches(p))
                .count()
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
