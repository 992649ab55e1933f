//! Core types shared across the engine.

mod error;
mod record;

pub use error::{Error, Result};
pub use record::{round_score, Record, Recommendation};
