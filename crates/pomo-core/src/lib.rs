//! Core domain logic for the pomodoro timer.
//!
//! This crate contains:
//! - The interval record and its category/state enums
//! - The repository contract and a volatile in-memory backend
//! - The interval engine: category cadence, resumption, and the tick loop

mod config;
mod engine;
mod error;
mod interval;
mod memory;
mod repository;
pub mod types;

pub use config::{DEFAULT_LONG_BREAK, DEFAULT_POMODORO, DEFAULT_SHORT_BREAK, IntervalConfig};
pub use engine::{TICK, get_interval, next_category};
pub use error::{BoxError, Error, Result};
pub use interval::Interval;
pub use memory::MemoryRepository;
pub use repository::Repository;
pub use types::{Category, CategoryFilter, State, UnknownCategory};

pub use tokio_util::sync::CancellationToken;
