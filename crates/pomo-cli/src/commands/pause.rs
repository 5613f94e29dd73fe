//! Pause command.

use std::io::Write;

use anyhow::{Context, Result};
use pomo_core::{IntervalConfig, get_interval};

/// Pauses the current interval.
///
/// The running `pomo start` loop picks up the paused state on its next tick.
pub fn run<W: Write>(writer: &mut W, config: &IntervalConfig) -> Result<()> {
    let interval = get_interval(config).context("failed to load current interval")?;
    interval.pause(config).context("failed to pause interval")?;
    writeln!(
        writer,
        "Paused {} #{} with {} remaining",
        interval.category,
        interval.id,
        humantime::format_duration(interval.remaining())
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use pomo_core::{Category, Error, Interval, MemoryRepository, Repository, State};

    fn config(repo: Arc<MemoryRepository>) -> IntervalConfig {
        IntervalConfig::new(repo, Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn pause_command_pauses_running_interval() {
        let repo = Arc::new(MemoryRepository::new());
        let mut running = Interval::new(Category::Pomodoro, Duration::from_secs(1500));
        running.state = State::Running;
        running.actual_duration = Duration::from_secs(600);
        repo.create(&running).unwrap();

        let mut output = Vec::new();
        run(&mut output, &config(repo.clone())).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Paused Pomodoro #1 with 15m remaining\n"
        );
        assert_eq!(repo.by_id(1).unwrap().state, State::Paused);
    }

    #[test]
    fn pause_command_fails_when_nothing_runs() {
        let repo = Arc::new(MemoryRepository::new());
        let mut output = Vec::new();

        let err = run(&mut output, &config(repo)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NotRunning)
        ));
        assert!(output.is_empty());
    }
}
