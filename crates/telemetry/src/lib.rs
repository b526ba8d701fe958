//! Internal telemetry for the matchday engine: tracing setup, component
//! health, and process-global operational counters.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
