//! Search module
//!
//! Resolves a validated query to a single candidate through the media engine.

mod executor;
mod models;

pub use executor::Search;
pub use models::*;
