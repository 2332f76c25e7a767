//! CLI command implementations

pub mod config;
pub mod flush;
pub mod list;
pub mod retrieve;
pub mod store;
