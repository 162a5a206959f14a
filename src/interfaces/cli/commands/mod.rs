//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod config;
mod links;
mod track;

pub use config::*;
pub use links::*;
pub use track::*;
