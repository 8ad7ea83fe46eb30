//! Daily events: recur at a fixed time of day.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::core::clock::{Clock, SystemClock};
use crate::core::event::{EventCore, Notifier, ScheduledEvent};
use crate::core::types::EventId;
use crate::events::{time_of_day, RecurrenceError};
use crate::scheduler::EventScheduler;

/// An event that recurs every day at the same time of day.
pub struct DailyEvent {
    core: EventCore,
    time: NaiveTime,
}

impl DailyEvent {
    /// Fire every day at the given time of day, starting with the next
    /// occurrence from now.
    ///
    /// Fails with [`RecurrenceError::InvalidTimeOfDay`] on out-of-range
    /// components.
    pub fn new(hour: u32, minute: u32, second: u32) -> Result<Self, RecurrenceError> {
        Self::with_clock(hour, minute, second, Arc::new(SystemClock))
    }

    /// [`new`](Self::new) with a custom clock.
    pub fn with_clock(
        hour: u32,
        minute: u32,
        second: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        let start_day = clock.now().date_naive();
        Self::build(hour, minute, second, start_day, clock)
    }

    /// Anchor the first occurrence on or after `start_day`.
    ///
    /// Fails with [`RecurrenceError::PastReference`] if `start_day` is
    /// before today.
    pub fn starting_on(
        hour: u32,
        minute: u32,
        second: u32,
        start_day: NaiveDate,
    ) -> Result<Self, RecurrenceError> {
        Self::starting_on_with_clock(hour, minute, second, start_day, Arc::new(SystemClock))
    }

    /// [`starting_on`](Self::starting_on) with a custom clock.
    pub fn starting_on_with_clock(
        hour: u32,
        minute: u32,
        second: u32,
        start_day: NaiveDate,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        if start_day < clock.now().date_naive() {
            let time = time_of_day(hour, minute, second)?;
            return Err(RecurrenceError::PastReference(
                start_day.and_time(time).and_utc(),
            ));
        }
        Self::build(hour, minute, second, start_day, clock)
    }

    /// Attach a callback invoked, with no arguments, on every trigger.
    pub fn with_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.core.notifier_mut().set_callback(Box::new(callback));
        self
    }

    /// The configured time of day.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    fn build(
        hour: u32,
        minute: u32,
        second: u32,
        start_day: NaiveDate,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        let time = time_of_day(hour, minute, second)?;
        let due = first_occurrence(time, start_day, clock.now());
        Ok(Self {
            core: EventCore::new(due, clock),
            time,
        })
    }
}

/// The first occurrence of `time` on or after `start_day` that is strictly
/// in the future.
fn first_occurrence(time: NaiveTime, start_day: NaiveDate, now: DateTime<Utc>) -> DateTime<Utc> {
    let mut due = start_day.and_time(time).and_utc();
    while due <= now {
        due += Duration::days(1);
    }
    due
}

#[async_trait]
impl ScheduledEvent for DailyEvent {
    fn due_at(&self) -> DateTime<Utc> {
        self.core.due()
    }

    async fn trigger(self: Arc<Self>, scheduler: &EventScheduler) {
        self.core.fire(scheduler).await;

        // At least one whole day forward, then further whole days until the
        // occurrence is strictly in the future.
        let now = self.core.now();
        let mut due = self.core.due() + Duration::days(1);
        while due <= now {
            due += Duration::days(1);
        }
        self.core.set_due(due);
        super::resubmit(self, scheduler).await;
    }

    fn notifier(&self) -> &Notifier {
        self.core.notifier()
    }

    fn id(&self) -> EventId {
        self.core.id()
    }

    fn kind(&self) -> &'static str {
        "daily"
    }
}
