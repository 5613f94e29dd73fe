//! Interval engine: category selection, resumption and the tick loop.
//!
//! The repository is the source of truth between calls. Nothing is cached in
//! process: every decision re-reads the stored intervals, and a running tick
//! loop learns about a pause only by re-fetching its interval on each tick.

use chrono::Utc;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::IntervalConfig;
use crate::interval::Interval;
use crate::repository::Repository;
use crate::types::{Category, State};
use crate::{Error, Result};

/// One elapsed unit of a running interval.
pub const TICK: Duration = Duration::from_secs(1);

/// Number of recent breaks inspected to place a long break.
const BREAK_WINDOW: usize = 3;

/// Decides which category the next interval should have.
///
/// Work always follows a break. After work, a long break is due once the last
/// three breaks were all short, which yields a long break every fourth break.
pub fn next_category(repo: &dyn Repository) -> Result<Category> {
    let last = match repo.last() {
        Ok(last) => last,
        Err(Error::NoIntervals) => return Ok(Category::Pomodoro),
        Err(err) => return Err(err),
    };

    if last.category.is_break() {
        return Ok(Category::Pomodoro);
    }

    let breaks = repo.breaks(BREAK_WINDOW)?;
    if breaks.len() < BREAK_WINDOW {
        return Ok(Category::ShortBreak);
    }

    if breaks.iter().any(|b| b.category == Category::LongBreak) {
        Ok(Category::ShortBreak)
    } else {
        Ok(Category::LongBreak)
    }
}

fn new_interval(config: &IntervalConfig) -> Result<Interval> {
    let category = next_category(config.repo())?;
    let mut interval = Interval::new(category, config.duration_for(category));
    interval.id = config.repo().create(&interval)?;
    tracing::debug!(id = interval.id, %category, "created interval");
    Ok(interval)
}

/// Returns the interval the caller should run now.
///
/// A not-started or paused interval is resumed as-is; otherwise a new one is
/// created with the next category.
pub fn get_interval(config: &IntervalConfig) -> Result<Interval> {
    match config.repo().last() {
        Ok(last) if !last.state.is_finished() => return Ok(last),
        Ok(_) | Err(Error::NoIntervals) => {}
        Err(err) => return Err(err),
    }

    new_interval(config)
}

impl Interval {
    /// Runs the interval until it expires, is paused, or `cancel` fires.
    ///
    /// `on_start` sees the interval as it was on loop entry, `on_tick` sees it
    /// after every persisted tick, and `on_end` sees it once marked done.
    /// Starting a running interval is a no-op. Cancellation persists the
    /// interval as cancelled and returns [`Error::Cancelled`].
    pub async fn start<S, T, E>(
        &self,
        cancel: &CancellationToken,
        config: &IntervalConfig,
        on_start: S,
        on_tick: T,
        on_end: E,
    ) -> Result<()>
    where
        S: FnMut(&Self),
        T: FnMut(&Self),
        E: FnMut(&Self),
    {
        let mut interval = self.clone();
        match interval.state {
            State::Running => return Ok(()),
            State::NotStarted => interval.start_time = Some(Utc::now()),
            State::Paused => {}
            State::Done | State::Cancelled => return Err(Error::Completed),
        }

        interval.state = State::Running;
        config.repo().update(&interval)?;
        tracing::debug!(id = interval.id, category = %interval.category, "interval running");

        tick(cancel, interval.id, config.repo(), on_start, on_tick, on_end).await
    }

    /// Marks a running interval as paused.
    ///
    /// The tick loop notices on its next tick and returns.
    pub fn pause(&self, config: &IntervalConfig) -> Result<()> {
        if self.state != State::Running {
            return Err(Error::NotRunning);
        }

        // Only the state changes; elapsed time stays whatever the tick loop last wrote.
        let mut interval = config.repo().by_id(self.id)?;
        if interval.state != State::Running {
            return Err(Error::NotRunning);
        }
        interval.state = State::Paused;
        config.repo().update(&interval)?;
        tracing::debug!(id = interval.id, "interval paused");
        Ok(())
    }
}

async fn tick<S, T, E>(
    cancel: &CancellationToken,
    id: i64,
    repo: &dyn Repository,
    mut on_start: S,
    mut on_tick: T,
    mut on_end: E,
) -> Result<()>
where
    S: FnMut(&Interval),
    T: FnMut(&Interval),
    E: FnMut(&Interval),
{
    let interval = repo.by_id(id)?;

    let entered = Instant::now();
    let mut ticker = time::interval_at(entered + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let expire = time::sleep_until(entered + interval.remaining());
    tokio::pin!(expire);

    on_start(&interval);

    loop {
        // Ticks win ties with expiry so the final unit is reported before the end.
        tokio::select! {
            biased;

            _ = ticker.tick() => {
                let mut interval = repo.by_id(id)?;
                if interval.state == State::Paused {
                    tracing::debug!(id, "tick loop observed pause");
                    return Ok(());
                }

                interval.actual_duration = (interval.actual_duration + TICK).min(interval.planned_duration);
                repo.update(&interval)?;
                tracing::trace!(id, elapsed = ?interval.actual_duration, "tick");
                on_tick(&interval);
            }
            () = &mut expire => {
                let mut interval = repo.by_id(id)?;
                interval.state = State::Done;
                repo.update(&interval)?;
                tracing::info!(id, category = %interval.category, "interval done");
                on_end(&interval);
                return Ok(());
            }
            () = cancel.cancelled() => {
                let mut interval = repo.by_id(id)?;
                interval.state = State::Cancelled;
                repo.update(&interval)?;
                tracing::info!(id, elapsed = ?interval.actual_duration, "interval cancelled");
                return Err(Error::Cancelled);
            }
        }
    }
}
