//! HTTP API layer for the matchday engine.

pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, DataPaths};
