//! CLI subcommand implementations.

pub mod pause;
pub mod start;
pub mod status;
pub mod summary;
