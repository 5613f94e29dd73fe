//! Start command: runs the current interval in the foreground.

use std::cell::RefCell;
use std::io::Write;

use anyhow::{Context, Result};
use pomo_core::{CancellationToken, Error, Interval, IntervalConfig, State, get_interval};

/// Starts or resumes the current interval and reports progress to `writer`.
///
/// Returns once the interval is done, paused from elsewhere, or cancelled.
/// Cancellation is a normal outcome, not an error.
pub async fn run<W: Write>(
    writer: &mut W,
    config: &IntervalConfig,
    cancel: &CancellationToken,
) -> Result<()> {
    let interval = get_interval(config).context("failed to load current interval")?;
    if interval.state == State::Running {
        writeln!(
            writer,
            "{} #{} is already running",
            interval.category, interval.id
        )?;
        return Ok(());
    }

    // Progress output is best effort; write failures must not stop the timer.
    let out = RefCell::new(&mut *writer);
    let result = interval
        .start(
            cancel,
            config,
            |i| {
                let _ = writeln!(out.borrow_mut(), "{}", heading(i));
            },
            |i| {
                let mut out = out.borrow_mut();
                let _ = write!(out, "\r{}", progress(i));
                let _ = out.flush();
            },
            |i| {
                let _ = writeln!(out.borrow_mut(), "\n{} done", i.category);
            },
        )
        .await;

    match result {
        Ok(()) => {
            let latest = config
                .repo()
                .by_id(interval.id)
                .context("failed to reload interval")?;
            if latest.state == State::Paused {
                writeln!(writer, "\n{} paused", latest.category)?;
            }
        }
        Err(Error::Cancelled) => writeln!(writer, "\n{} cancelled", interval.category)?,
        Err(err) => return Err(err).context("interval run failed"),
    }
    Ok(())
}

fn heading(interval: &Interval) -> String {
    format!(
        "{} #{} ({})",
        interval.category,
        interval.id,
        humantime::format_duration(interval.remaining())
    )
}

fn progress(interval: &Interval) -> String {
    format!(
        "{}: {} remaining",
        interval.category,
        humantime::format_duration(interval.remaining())
    )
}
