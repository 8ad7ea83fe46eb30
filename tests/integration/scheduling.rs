//! End-to-end scheduling scenarios against a live driver loop.

use std::sync::Arc;
use std::time::Duration;

use carillon::testing::{ManualClock, RecordingObserver};
use carillon::{
    Clock, EventScheduler, IntervalEvent, OneShotEvent, ScheduledEvent, SchedulerError,
};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};

use crate::common::wait_for_triggers;

#[tokio::test]
async fn test_one_shot_event_fires_once_and_leaves_the_queue() {
    let (scheduler, driver) = EventScheduler::new()
        .with_tick_interval(Duration::from_millis(10))
        .start();

    let observer = RecordingObserver::new();
    let event: Arc<dyn ScheduledEvent> =
        Arc::new(OneShotEvent::new(Utc::now() + ChronoDuration::milliseconds(50)).unwrap());
    event.notifier().register(observer.clone()).await;
    scheduler.submit(event).await.unwrap();

    wait_for_triggers(&observer, 1, Duration::from_secs(2)).await;

    // Give the driver a few more cycles: the one-shot must not re-fire.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(observer.count(), 1);
    assert_eq!(scheduler.queued().await, 0);

    driver.abort();
}

#[tokio::test]
async fn test_interval_event_keeps_firing() {
    let (scheduler, driver) = EventScheduler::new()
        .with_tick_interval(Duration::from_millis(10))
        .start();

    let observer = RecordingObserver::new();
    let event: Arc<dyn ScheduledEvent> =
        Arc::new(IntervalEvent::new(Duration::from_millis(40)).unwrap());
    event.notifier().register(observer.clone()).await;
    scheduler.submit(event.clone()).await.unwrap();

    wait_for_triggers(&observer, 3, Duration::from_secs(5)).await;

    // Still queued for the next occurrence.
    assert_eq!(scheduler.queued().await, 1);
    assert!(event.due_at() > Utc::now() - ChronoDuration::milliseconds(50));

    driver.abort();
}

#[tokio::test]
async fn test_submitting_a_lapsed_event_is_rejected() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let event: Arc<dyn ScheduledEvent> = Arc::new(
        OneShotEvent::with_clock(clock.now() + ChronoDuration::seconds(1), clock.clone()).unwrap(),
    );
    clock.advance(ChronoDuration::seconds(2));

    let result = scheduler.submit(event).await;
    assert!(matches!(
        result,
        Err(SchedulerError::InvalidSchedule { .. })
    ));
    assert_eq!(scheduler.queued().await, 0);
}

#[tokio::test]
async fn test_backlog_drains_in_ascending_due_order_in_one_cycle() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());
    let observer = RecordingObserver::new();

    // Submit out of order, then sleep past all of them.
    for minutes in [7, 2, 9, 4, 1] {
        let event: Arc<dyn ScheduledEvent> = Arc::new(
            OneShotEvent::with_clock(
                clock.now() + ChronoDuration::minutes(minutes),
                clock.clone(),
            )
            .unwrap(),
        );
        event.notifier().register(observer.clone()).await;
        scheduler.submit(event).await.unwrap();
    }

    clock.advance(ChronoDuration::hours(1));
    let triggered = scheduler.poll_once().await;

    assert_eq!(triggered, 5);
    let dues = observer.due_moments();
    let mut sorted = dues.clone();
    sorted.sort();
    assert_eq!(dues, sorted);
    assert_eq!(scheduler.queued().await, 0);
}

#[tokio::test]
async fn test_submissions_from_observers_land_in_the_same_queue() {
    // An observer that schedules a follow-up through the driver reference
    // it is handed, exercising re-entrant submission during a drain.
    use async_trait::async_trait;
    use carillon::{TriggerContext, TriggerObserver};

    struct FollowUpObserver {
        follow_up: std::sync::Mutex<Option<Arc<dyn ScheduledEvent>>>,
    }

    #[async_trait]
    impl TriggerObserver for FollowUpObserver {
        async fn on_trigger(&self, ctx: &TriggerContext<'_>) {
            let follow_up = self.follow_up.lock().unwrap().take();
            if let Some(event) = follow_up {
                ctx.scheduler.submit(event).await.unwrap();
            }
        }
    }

    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
    let scheduler = EventScheduler::new().with_clock(clock.clone());

    let follow_up: Arc<dyn ScheduledEvent> = Arc::new(
        OneShotEvent::with_clock(clock.now() + ChronoDuration::hours(2), clock.clone()).unwrap(),
    );
    let first: Arc<dyn ScheduledEvent> = Arc::new(
        OneShotEvent::with_clock(clock.now() + ChronoDuration::seconds(1), clock.clone()).unwrap(),
    );
    first
        .notifier()
        .register(Arc::new(FollowUpObserver {
            follow_up: std::sync::Mutex::new(Some(follow_up)),
        }))
        .await;
    scheduler.submit(first).await.unwrap();

    clock.advance(ChronoDuration::seconds(5));
    assert_eq!(scheduler.poll_once().await, 1);

    // The follow-up was accepted mid-drain and waits its turn.
    assert_eq!(scheduler.queued().await, 1);
}
