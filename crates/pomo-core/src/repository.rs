//! Storage contract for intervals.

use std::time::Duration;

use chrono::NaiveDate;

use crate::Result;
use crate::interval::Interval;
use crate::types::CategoryFilter;

/// Persists and retrieves [`Interval`] records.
///
/// Backends must be interchangeable: the same inputs produce the same results
/// and the same error variants. Implementations do their own locking.
pub trait Repository: Send + Sync {
    /// Stores a new interval and returns its assigned id.
    fn create(&self, interval: &Interval) -> Result<i64>;

    /// Overwrites the stored interval with the same id.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if the id is unknown.
    fn update(&self, interval: &Interval) -> Result<()>;

    /// Fetches an interval by id.
    fn by_id(&self, id: i64) -> Result<Interval>;

    /// Returns the most recently created interval.
    ///
    /// Fails with [`Error::NoIntervals`](crate::Error::NoIntervals) on an empty store.
    fn last(&self) -> Result<Interval>;

    /// Returns up to `n` of the most recent breaks, newest first.
    fn breaks(&self, n: usize) -> Result<Vec<Interval>>;

    /// Sums the actual duration of intervals started on `day` (UTC) that pass `filter`.
    fn category_summary(&self, day: NaiveDate, filter: CategoryFilter) -> Result<Duration>;
}
