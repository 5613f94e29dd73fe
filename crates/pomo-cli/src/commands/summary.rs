//! Summary command for daily work and break totals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pomo_core::{Category, CategoryFilter, Repository};

pub fn run<W: Write>(writer: &mut W, repo: &dyn Repository, day: NaiveDate) -> Result<()> {
    let work = repo
        .category_summary(day, CategoryFilter::Only(Category::Pomodoro))
        .context("failed to sum pomodoro time")?;
    let rest = repo
        .category_summary(day, CategoryFilter::Breaks)
        .context("failed to sum break time")?;

    writeln!(writer, "Summary for {day}")?;
    writeln!(writer, "Pomodoro: {}", humantime::format_duration(work))?;
    writeln!(writer, "Breaks: {}", humantime::format_duration(rest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use insta::assert_snapshot;
    use pomo_core::{Interval, MemoryRepository, State};

    #[test]
    fn summary_command_totals_day() {
        let repo = MemoryRepository::new();
        let start = Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();
        for (category, secs) in [
            (Category::Pomodoro, 1500),
            (Category::ShortBreak, 300),
            (Category::Pomodoro, 600),
            (Category::LongBreak, 900),
        ] {
            let mut interval = Interval::new(category, Duration::from_secs(secs));
            interval.state = State::Done;
            interval.start_time = Some(start);
            interval.actual_duration = Duration::from_secs(secs);
            repo.create(&interval).unwrap();
        }

        let mut output = Vec::new();
        let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        run(&mut output, &repo, day).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Summary for 2025-03-14
        Pomodoro: 35m
        Breaks: 20m
        ");
    }
}
