//! Pomodoro timer CLI library.
//!
//! This crate provides the interactive session driver for the interval engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Backend, Config, Overrides};
