//! Core types, validation, and the session window algorithm for the Matchday
//! engine.

pub mod error;
pub mod events;
pub mod reference;
pub mod report;
pub mod session;
pub mod validate;

pub use error::{Error, Result};
pub use events::*;
pub use reference::*;
pub use report::*;
pub use session::*;
pub use validate::*;
