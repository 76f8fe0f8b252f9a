//! Subcommand implementations.

pub mod catalog;
pub mod partitions;
pub mod schema;
