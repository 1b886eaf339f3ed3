//! # hoopgrid-core
//!
//! Player data model and filter engine primitives for the hoopgrid daily
//! puzzle:
//! - [`player::Player`]     — a read-only player record with career stats
//! - [`player::PlayerPool`] — the in-memory queryable player collection
//! - [`filter::GameFilter`] — closed sum type over static and dynamic filters
//! - [`catalog`]            — the full seeded inventory of available filters
//! - [`registry`]           — string-tag ↔ filter construction for persistence

pub mod catalog;
pub mod error;
pub mod filter;
pub mod player;
pub mod registry;

pub use error::CoreError;
pub use filter::{Comparison, DynamicConfig, DynamicFilter, GameFilter, StaticFilter};
pub use player::{Player, PlayerPool, StatField};
pub use registry::StoredFilter;
