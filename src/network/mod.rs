//! Network module
//!
//! Builds the HTTP client the bot API requests go through.

mod client;

pub use client::build_client;
