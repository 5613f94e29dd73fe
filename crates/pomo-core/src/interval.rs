//! The interval record.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Category, State};

/// One scheduled span of work or rest.
///
/// `category` and `planned_duration` are fixed at creation. During a run only
/// `actual_duration` changes, one second per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Identifier assigned by the repository. Zero until created.
    pub id: i64,

    /// Set when the interval first leaves `NotStarted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    pub planned_duration: Duration,

    #[serde(default)]
    pub actual_duration: Duration,

    pub category: Category,

    pub state: State,
}

impl Interval {
    /// Creates a not-yet-persisted interval.
    pub const fn new(category: Category, planned_duration: Duration) -> Self {
        Self {
            id: 0,
            start_time: None,
            planned_duration,
            actual_duration: Duration::ZERO,
            category,
            state: State::NotStarted,
        }
    }

    /// Time left before the interval expires.
    pub const fn remaining(&self) -> Duration {
        self.planned_duration.saturating_sub(self.actual_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_new() {
        let interval = Interval::new(Category::ShortBreak, Duration::from_secs(300));

        assert_eq!(interval.id, 0);
        assert_eq!(interval.start_time, None);
        assert_eq!(interval.actual_duration, Duration::ZERO);
        assert_eq!(interval.category, Category::ShortBreak);
        assert_eq!(interval.state, State::NotStarted);
    }

    #[test]
    fn test_remaining_saturates() {
        let mut interval = Interval::new(Category::Pomodoro, Duration::from_secs(3));
        interval.actual_duration = Duration::from_secs(1);
        assert_eq!(interval.remaining(), Duration::from_secs(2));

        interval.actual_duration = Duration::from_secs(5);
        assert_eq!(interval.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_interval_serde_roundtrip() {
        let interval = Interval::new(Category::LongBreak, Duration::from_secs(900));

        let json = serde_json::to_string(&interval).unwrap();
        let parsed: Interval = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, interval);
    }
}
