//! Calendar recurrence round trips, driven by a manual clock.

use std::sync::Arc;
use std::time::Duration;

use carillon::testing::{ManualClock, RecordingObserver};
use carillon::{
    Clock, DailyEvent, EventScheduler, IntervalEvent, MonthlyEvent, ScheduledEvent, WeeklyEvent,
    WeeklySlot, YearlyEvent,
};
use chrono::{Duration as ChronoDuration, TimeZone, Utc, Weekday};

/// Advance the clock to the event's due moment plus a second, poll, and
/// assert exactly one trigger fired.
async fn fire_next(
    scheduler: &EventScheduler,
    clock: &Arc<ManualClock>,
    event: &Arc<dyn ScheduledEvent>,
) {
    clock.set(event.due_at() + ChronoDuration::seconds(1));
    assert_eq!(scheduler.poll_once().await, 1);
}

#[tokio::test]
async fn test_interval_round_trip() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let event: Arc<dyn ScheduledEvent> = Arc::new(
        IntervalEvent::with_clock(Duration::from_secs(600), clock.clone()).unwrap(),
    );
    scheduler.submit(event.clone()).await.unwrap();
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 10, 0).unwrap()
    );

    fire_next(&scheduler, &clock, &event).await;

    // Due one period after the trigger moment, and re-queued.
    assert_eq!(event.due_at(), clock.now() + ChronoDuration::seconds(600));
    assert_eq!(scheduler.queued().await, 1);
}

#[tokio::test]
async fn test_weekly_wednesday_start_walks_friday_then_monday() {
    // Wednesday 2024-01-17.
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let slots = vec![
        WeeklySlot::new(Weekday::Mon, 9, 0, 0).unwrap(),
        WeeklySlot::new(Weekday::Fri, 17, 0, 0).unwrap(),
    ];
    let observer = RecordingObserver::new();
    let event: Arc<dyn ScheduledEvent> =
        Arc::new(WeeklyEvent::with_clock(slots, clock.clone()).unwrap());
    event.notifier().register(observer.clone()).await;
    scheduler.submit(event.clone()).await.unwrap();

    // First due: the upcoming Friday 17:00.
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2024, 1, 19, 17, 0, 0).unwrap()
    );

    fire_next(&scheduler, &clock, &event).await;

    // Next due: the following Monday 09:00.
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2024, 1, 22, 9, 0, 0).unwrap()
    );

    fire_next(&scheduler, &clock, &event).await;

    // And back to Friday.
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2024, 1, 26, 17, 0, 0).unwrap()
    );
    assert_eq!(observer.count(), 2);
}

#[tokio::test]
async fn test_monthly_31st_clamps_and_resumes() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let event: Arc<dyn ScheduledEvent> = Arc::new(
        MonthlyEvent::with_clock(
            Utc.with_ymd_and_hms(2024, 3, 31, 10, 0, 0).unwrap(),
            clock.clone(),
        )
        .unwrap(),
    );
    scheduler.submit(event.clone()).await.unwrap();

    // March 31 fires; April is 30 days, so the next lands on its last day.
    fire_next(&scheduler, &clock, &event).await;
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2024, 4, 30, 10, 0, 0).unwrap()
    );

    // April 30 fires; May has a 31st, so the anchor resumes.
    fire_next(&scheduler, &clock, &event).await;
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2024, 5, 31, 10, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_daily_catches_up_after_a_long_sleep() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let observer = RecordingObserver::new();
    let event: Arc<dyn ScheduledEvent> =
        Arc::new(DailyEvent::with_clock(9, 0, 0, clock.clone()).unwrap());
    event.notifier().register(observer.clone()).await;
    scheduler.submit(event.clone()).await.unwrap();

    // The process sleeps through four daily occurrences.
    clock.set(Utc.with_ymd_and_hms(2024, 1, 19, 12, 0, 0).unwrap());
    assert_eq!(scheduler.poll_once().await, 1);

    // One trigger for the backlog; the next occurrence is tomorrow, in the
    // future, not a stale catch-up moment.
    assert_eq!(observer.count(), 1);
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2024, 1, 20, 9, 0, 0).unwrap()
    );
    assert_eq!(scheduler.queued().await, 1);
}

#[tokio::test]
async fn test_yearly_round_trip() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let event: Arc<dyn ScheduledEvent> = Arc::new(
        YearlyEvent::with_clock(
            Utc.with_ymd_and_hms(2024, 7, 14, 20, 0, 0).unwrap(),
            clock.clone(),
        )
        .unwrap(),
    );
    scheduler.submit(event.clone()).await.unwrap();

    fire_next(&scheduler, &clock, &event).await;
    assert_eq!(
        event.due_at(),
        Utc.with_ymd_and_hms(2025, 7, 14, 20, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_observers_survive_resubmission() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let observer = RecordingObserver::new();
    let event: Arc<dyn ScheduledEvent> = Arc::new(
        IntervalEvent::with_clock(Duration::from_secs(60), clock.clone()).unwrap(),
    );
    event.notifier().register(observer.clone()).await;
    scheduler.submit(event.clone()).await.unwrap();

    // The same handle re-enters the queue after each trigger, so the
    // registration made once keeps delivering.
    for expected in 1..=4 {
        fire_next(&scheduler, &clock, &event).await;
        assert_eq!(observer.count(), expected);
    }
}
