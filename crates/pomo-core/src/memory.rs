//! Volatile repository backed by a vector.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{NaiveDate, SubsecRound};

use crate::interval::Interval;
use crate::repository::Repository;
use crate::types::CategoryFilter;
use crate::{Error, Result};

/// In-memory [`Repository`].
///
/// Intervals live in creation order and their id is their position plus one.
/// Durations and start times are kept to the millisecond, like the SQLite
/// backend. Contents are lost when the repository is dropped.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    intervals: Mutex<Vec<Interval>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Interval>>> {
        self.intervals
            .lock()
            .map_err(|err| Error::storage(err.to_string()))
    }
}

/// Truncates to the millisecond precision every backend stores.
fn to_millis(interval: &Interval) -> Interval {
    let truncate =
        |d: Duration| Duration::from_millis(u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    Interval {
        start_time: interval.start_time.map(|start| start.trunc_subsecs(3)),
        planned_duration: truncate(interval.planned_duration),
        actual_duration: truncate(interval.actual_duration),
        ..interval.clone()
    }
}

fn index_of(id: i64, len: usize) -> Option<usize> {
    usize::try_from(id)
        .ok()
        .and_then(|id| id.checked_sub(1))
        .filter(|&idx| idx < len)
}

impl Repository for MemoryRepository {
    fn create(&self, interval: &Interval) -> Result<i64> {
        let mut intervals = self.lock()?;
        let id = i64::try_from(intervals.len() + 1).map_err(Error::storage)?;
        let mut stored = to_millis(interval);
        stored.id = id;
        intervals.push(stored);
        Ok(id)
    }

    fn update(&self, interval: &Interval) -> Result<()> {
        let mut intervals = self.lock()?;
        let idx = index_of(interval.id, intervals.len()).ok_or(Error::NotFound(interval.id))?;
        intervals[idx] = to_millis(interval);
        Ok(())
    }

    fn by_id(&self, id: i64) -> Result<Interval> {
        let intervals = self.lock()?;
        let idx = index_of(id, intervals.len()).ok_or(Error::NotFound(id))?;
        Ok(intervals[idx].clone())
    }

    fn last(&self) -> Result<Interval> {
        self.lock()?.last().cloned().ok_or(Error::NoIntervals)
    }

    fn breaks(&self, n: usize) -> Result<Vec<Interval>> {
        Ok(self
            .lock()?
            .iter()
            .rev()
            .filter(|interval| interval.category.is_break())
            .take(n)
            .cloned()
            .collect())
    }

    fn category_summary(&self, day: NaiveDate, filter: CategoryFilter) -> Result<Duration> {
        Ok(self
            .lock()?
            .iter()
            .filter(|interval| filter.matches(interval.category))
            .filter(|interval| {
                interval
                    .start_time
                    .is_some_and(|start| start.date_naive() == day)
            })
            .map(|interval| interval.actual_duration)
            .sum())
    }
}
