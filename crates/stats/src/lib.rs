//! Statistics aggregation over the event store.
//!
//! Per-metric calculator functions composed into two replies: user
//! stats and game stats. Session-derived numbers are only final after a
//! batch recompute has run; incremental assignments are best effort.

pub mod calculators;
pub mod date;
pub mod game;
pub mod user;

pub use date::day_range;
pub use game::{game_stats, GameStats};
pub use user::{user_stats, CountryInfo, UserStats};
