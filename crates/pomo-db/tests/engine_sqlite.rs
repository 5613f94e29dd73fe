//! Runs the interval engine against a SQLite file.

use std::sync::Arc;
use std::time::Duration;

use pomo_core::{
    CancellationToken, Category, CategoryFilter, Error, IntervalConfig, Repository, State,
    get_interval,
};
use pomo_db::SqliteRepository;
use tempfile::TempDir;

fn sqlite_config(temp: &TempDir) -> (Arc<SqliteRepository>, IntervalConfig) {
    let repo = Arc::new(SqliteRepository::open(&temp.path().join("pomo.db")).unwrap());
    let config = IntervalConfig::new(
        repo.clone(),
        Duration::from_secs(3),
        Duration::from_secs(2),
        Duration::from_secs(4),
    );
    (repo, config)
}

#[tokio::test(start_paused = true)]
async fn completed_run_is_persisted() {
    let temp = TempDir::new().unwrap();
    let (repo, config) = sqlite_config(&temp);

    let interval = get_interval(&config).unwrap();
    assert_eq!(interval.category, Category::Pomodoro);
    assert_eq!(interval.state, State::NotStarted);

    let token = CancellationToken::new();
    let mut ticks = Vec::new();
    let mut ends = 0;
    interval
        .start(
            &token,
            &config,
            |_| {},
            |i| ticks.push(i.actual_duration.as_secs()),
            |_| ends += 1,
        )
        .await
        .unwrap();

    assert_eq!(ticks, vec![1, 2, 3]);
    assert_eq!(ends, 1);

    let stored = repo.by_id(interval.id).unwrap();
    assert_eq!(stored.state, State::Done);
    assert_eq!(stored.actual_duration, Duration::from_secs(3));

    let day = stored.start_time.unwrap().date_naive();
    let work = repo
        .category_summary(day, CategoryFilter::Only(Category::Pomodoro))
        .unwrap();
    assert_eq!(work, Duration::from_secs(3));

    let next = get_interval(&config).unwrap();
    assert_eq!(next.category, Category::ShortBreak);
    assert_eq!(next.planned_duration, Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn cancelled_run_is_persisted() {
    let temp = TempDir::new().unwrap();
    let (repo, config) = sqlite_config(&temp);

    let interval = get_interval(&config).unwrap();
    let token = CancellationToken::new();
    let result = interval
        .start(
            &token,
            &config,
            |_| {},
            |i| {
                if i.actual_duration == Duration::from_secs(1) {
                    token.cancel();
                }
            },
            |_| panic!("cancelled interval must not end"),
        )
        .await;

    assert!(matches!(result, Err(Error::Cancelled)));
    let stored = repo.by_id(interval.id).unwrap();
    assert_eq!(stored.state, State::Cancelled);
    assert_eq!(stored.actual_duration, Duration::from_secs(1));

    let again = stored.start(&token, &config, |_| {}, |_| {}, |_| {}).await;
    assert!(matches!(again, Err(Error::Completed)));
}

#[tokio::test(start_paused = true)]
async fn pause_through_second_connection_stops_loop() {
    let temp = TempDir::new().unwrap();
    let (_repo, config) = sqlite_config(&temp);
    let interval = get_interval(&config).unwrap();
    let id = interval.id;

    let handle = tokio::spawn({
        let config = config.clone();
        async move {
            let token = CancellationToken::new();
            interval.start(&token, &config, |_| {}, |_| {}, |_| {}).await
        }
    });

    tokio::time::sleep(Duration::from_millis(1500)).await;

    // A separate connection stands in for another process.
    let other = Arc::new(SqliteRepository::open(&temp.path().join("pomo.db")).unwrap());
    let other_config = IntervalConfig::new(
        other.clone(),
        Duration::ZERO,
        Duration::ZERO,
        Duration::ZERO,
    );
    let running = get_interval(&other_config).unwrap();
    assert_eq!(running.id, id);
    assert_eq!(running.state, State::Running);
    running.pause(&other_config).unwrap();

    handle.await.unwrap().unwrap();

    let paused = other.by_id(id).unwrap();
    assert_eq!(paused.state, State::Paused);
    assert_eq!(paused.actual_duration, Duration::from_secs(1));
}

#[test]
fn pause_keeps_tick_written_by_other_connection() {
    let temp = TempDir::new().unwrap();
    let (repo, config) = sqlite_config(&temp);

    let mut running = get_interval(&config).unwrap();
    running.state = State::Running;
    running.actual_duration = Duration::from_secs(1);
    repo.update(&running).unwrap();

    // The pausing side reads first, then the tick loop writes its next unit.
    let copy = repo.by_id(running.id).unwrap();
    let ticker = SqliteRepository::open(&temp.path().join("pomo.db")).unwrap();
    let mut ticked = ticker.by_id(running.id).unwrap();
    ticked.actual_duration = Duration::from_secs(2);
    ticker.update(&ticked).unwrap();

    copy.pause(&config).unwrap();

    let saved = repo.by_id(running.id).unwrap();
    assert_eq!(saved.state, State::Paused);
    assert_eq!(saved.actual_duration, Duration::from_secs(2));
}
