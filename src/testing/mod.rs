//! Testing utilities for users of the carillon library.
//!
//! This module provides helpers for testing scheduled events:
//!
//! - [`ManualClock`]: a clock that only moves when told to, so schedules
//!   can be exercised without real delays
//! - [`RecordingObserver`]: records every trigger it receives
//! - [`RecordingSink`]: records scheduler lifecycle notifications

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::core::clock::Clock;
use crate::core::event::{TriggerContext, TriggerObserver};
use crate::scheduler::sink::{SchedulerEvent, SchedulerSink};

/// A clock that only moves when told to.
///
/// # Example
///
/// ```
/// use carillon::testing::ManualClock;
/// use carillon::Clock;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
/// clock.advance(Duration::seconds(30));
/// assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 30).unwrap());
/// ```
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: RwLock::new(start),
        })
    }

    /// Jump the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = now;
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}

/// Observer that records every trigger it receives.
#[derive(Default)]
pub struct RecordingObserver {
    triggers: Mutex<Vec<RecordedTrigger>>,
}

/// One recorded trigger delivery.
#[derive(Debug, Clone, Copy)]
pub struct RecordedTrigger {
    /// The due moment that fired.
    pub due: DateTime<Utc>,
    /// When the trigger ran.
    pub fired_at: DateTime<Utc>,
}

impl RecordingObserver {
    /// Create a shareable recording observer.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of triggers seen so far.
    pub fn count(&self) -> usize {
        self.triggers.lock().expect("trigger lock poisoned").len()
    }

    /// Every recorded trigger, in delivery order.
    pub fn triggers(&self) -> Vec<RecordedTrigger> {
        self.triggers
            .lock()
            .expect("trigger lock poisoned")
            .clone()
    }

    /// The due moments that fired, in delivery order.
    pub fn due_moments(&self) -> Vec<DateTime<Utc>> {
        self.triggers()
            .into_iter()
            .map(|trigger| trigger.due)
            .collect()
    }
}

#[async_trait]
impl TriggerObserver for RecordingObserver {
    async fn on_trigger(&self, ctx: &TriggerContext<'_>) {
        self.triggers
            .lock()
            .expect("trigger lock poisoned")
            .push(RecordedTrigger {
                due: ctx.due,
                fired_at: ctx.fired_at,
            });
    }
}

/// Sink that records scheduler lifecycle notifications.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SchedulerEvent>>,
}

impl RecordingSink {
    /// Create a shareable recording sink.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every recorded notification, in emission order.
    pub fn events(&self) -> Vec<SchedulerEvent> {
        self.events.lock().expect("event lock poisoned").clone()
    }
}

#[async_trait]
impl SchedulerSink for RecordingSink {
    async fn handle(&self, event: &SchedulerEvent) {
        self.events
            .lock()
            .expect("event lock poisoned")
            .push(event.clone());
    }
}
