//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::{Backend, Overrides};

/// Interactive pomodoro timer.
///
/// Alternates work intervals with short breaks, and every fourth break is a
/// long one. Interval history is kept in a local database.
#[derive(Debug, Parser)]
#[command(name = "pomo", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file.
    #[arg(short, long, global = true)]
    pub db: Option<PathBuf>,

    /// Storage backend.
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Pomodoro duration (e.g., "25m").
    #[arg(short, long = "pomo", global = true)]
    pub pomodoro: Option<String>,

    /// Short break duration (e.g., "5m").
    #[arg(short, long, global = true)]
    pub short: Option<String>,

    /// Long break duration (e.g., "15m").
    #[arg(short, long, global = true)]
    pub long: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Configuration values set by flags.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            database_path: self.db.clone(),
            backend: self.backend,
            pomodoro: self.pomodoro.clone(),
            short_break: self.short.clone(),
            long_break: self.long.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start or resume the current interval. Ctrl-C cancels it.
    Start,

    /// Pause the running interval.
    Pause,

    /// Show the most recent interval.
    Status,

    /// Show time spent working and resting on a day.
    Summary {
        /// Day to summarize (YYYY-MM-DD, UTC). Defaults to today.
        #[arg(long)]
        day: Option<NaiveDate>,
    },
}
