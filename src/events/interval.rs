//! Fixed-interval events: recur every fixed duration.
//!
//! The first occurrence is one period after the start moment (now by
//! default); each trigger reschedules one period after the trigger itself,
//! so the cadence is measured from trigger to trigger, not from the
//! original start.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::clock::{Clock, SystemClock};
use crate::core::event::{EventCore, Notifier, ScheduledEvent};
use crate::core::types::EventId;
use crate::events::RecurrenceError;
use crate::scheduler::EventScheduler;

/// An event that recurs every fixed duration.
pub struct IntervalEvent {
    core: EventCore,
    period: chrono::Duration,
}

impl IntervalEvent {
    /// Recur every `period`, first firing one period from now.
    pub fn new(period: Duration) -> Result<Self, RecurrenceError> {
        Self::with_clock(period, Arc::new(SystemClock))
    }

    /// Recur every `period`, reading time from a custom clock.
    pub fn with_clock(period: Duration, clock: Arc<dyn Clock>) -> Result<Self, RecurrenceError> {
        let start = clock.now();
        Self::build(period, start, clock)
    }

    /// Recur every `period`, first firing one period after `start`.
    ///
    /// Fails with [`RecurrenceError::PastReference`] if `start` has already
    /// passed.
    pub fn starting_at(period: Duration, start: DateTime<Utc>) -> Result<Self, RecurrenceError> {
        Self::starting_at_with_clock(period, start, Arc::new(SystemClock))
    }

    /// [`starting_at`](Self::starting_at) with a custom clock.
    pub fn starting_at_with_clock(
        period: Duration,
        start: DateTime<Utc>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        if start < clock.now() {
            return Err(RecurrenceError::PastReference(start));
        }
        Self::build(period, start, clock)
    }

    /// Attach a callback invoked, with no arguments, on every trigger.
    pub fn with_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.core.notifier_mut().set_callback(Box::new(callback));
        self
    }

    /// The recurrence period.
    pub fn period(&self) -> Duration {
        self.period.to_std().expect("period was built from a std duration")
    }

    fn build(
        period: Duration,
        start: DateTime<Utc>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        if period.is_zero() {
            return Err(RecurrenceError::InvalidPeriod(period));
        }
        let chrono_period =
            chrono::Duration::from_std(period).map_err(|_| RecurrenceError::InvalidPeriod(period))?;
        Ok(Self {
            core: EventCore::new(start + chrono_period, clock),
            period: chrono_period,
        })
    }
}

#[async_trait]
impl ScheduledEvent for IntervalEvent {
    fn due_at(&self) -> DateTime<Utc> {
        self.core.due()
    }

    async fn trigger(self: Arc<Self>, scheduler: &EventScheduler) {
        self.core.fire(scheduler).await;
        self.core.set_due(self.core.now() + self.period);
        super::resubmit(self, scheduler).await;
    }

    fn notifier(&self) -> &Notifier {
        self.core.notifier()
    }

    fn id(&self) -> EventId {
        self.core.id()
    }

    fn kind(&self) -> &'static str {
        "interval"
    }
}
