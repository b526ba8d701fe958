//! SQLite-backed event store for the matchday analytics engine.

pub mod config;
pub mod query;
pub mod schema;
pub mod store;

pub use config::StoreConfig;
pub use query::*;
pub use store::{BatchWriter, EventStore};
