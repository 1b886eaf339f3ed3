//! Inverse-weight roulette sampling without replacement.
//!
//! Each candidate's selection mass is `1 / weight`, so the types the usage
//! calculator penalized are proportionally less likely to be drawn. All
//! randomness comes from the caller's [`StdRng`] — results are reproducible
//! for a given seed and never touch global random state.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;

use hoopgrid_core::GameFilter;

/// Draw `count` distinct filters from `pool`, lower weights first in
/// expectation.
pub fn select_weighted(
    pool: Vec<GameFilter>,
    weights: &HashMap<String, f64>,
    count: usize,
    rng: &mut StdRng,
) -> Vec<GameFilter> {
    let mut order = weighted_order(pool, weights, rng);
    order.truncate(count);
    order
}

/// A full weighted draw order over the pool.
///
/// The grid builder walks this to fall through to the next-most-preferred
/// candidate whenever one fails tuning.
pub fn weighted_order(
    mut pool: Vec<GameFilter>,
    weights: &HashMap<String, f64>,
    rng: &mut StdRng,
) -> Vec<GameFilter> {
    let mut order = Vec::with_capacity(pool.len());
    while let Some(filter) = draw(&mut pool, weights, rng) {
        order.push(filter);
    }
    order
}

/// One roulette draw; removes and returns the selected candidate.
///
/// Zero and negative weights contribute no mass (they cannot win a spin);
/// if the whole pool has no mass the draw degrades to uniform.
fn draw(
    pool: &mut Vec<GameFilter>,
    weights: &HashMap<String, f64>,
    rng: &mut StdRng,
) -> Option<GameFilter> {
    if pool.is_empty() {
        return None;
    }

    let masses: Vec<f64> = pool
        .iter()
        .map(|f| {
            let weight = weights.get(&f.type_descriptor()).copied().unwrap_or(1.0);
            if weight > 0.0 {
                1.0 / weight
            } else {
                0.0
            }
        })
        .collect();

    let total: f64 = masses.iter().sum();
    if total <= 0.0 {
        let idx = rng.gen_range(0..pool.len());
        return Some(pool.remove(idx));
    }

    let spin = rng.gen::<f64>() * total;
    let mut upto = 0.0;
    let mut chosen = pool.len() - 1;
    for (idx, mass) in masses.iter().enumerate() {
        upto += mass;
        if upto > spin {
            chosen = idx;
            break;
        }
    }
    Some(pool.remove(chosen))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
