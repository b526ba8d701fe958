//! Ingestion pipeline: batch event loading, reference data, and the
//! session recompute driver.

pub mod ingest;
pub mod initialize;
pub mod recompute;
pub mod reference;

pub use ingest::{ingest_file, ingest_lines};
pub use initialize::{initialize, InitializeReport};
pub use recompute::{recompute_all, RecomputeReport};
pub use reference::load_reference_file;
