//! Status command for showing the most recent interval.

use std::io::Write;

use anyhow::Result;
use pomo_core::{Error, Interval, Repository};

pub fn run<W: Write>(writer: &mut W, repo: &dyn Repository) -> Result<()> {
    let interval = match repo.last() {
        Ok(interval) => interval,
        Err(Error::NoIntervals) => {
            writeln!(writer, "No intervals recorded.")?;
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    write_interval(writer, &interval)
}

fn write_interval<W: Write>(writer: &mut W, interval: &Interval) -> Result<()> {
    writeln!(writer, "Interval #{}", interval.id)?;
    writeln!(writer, "Category: {}", interval.category)?;
    writeln!(writer, "State: {}", interval.state)?;
    writeln!(
        writer,
        "Elapsed: {} of {}",
        humantime::format_duration(interval.actual_duration),
        humantime::format_duration(interval.planned_duration)
    )?;
    match interval.start_time {
        Some(start) => writeln!(writer, "Started: {}", start.format("%Y-%m-%d %H:%M:%S UTC"))?,
        None => writeln!(writer, "Started: -")?,
    }
    Ok(())
}
