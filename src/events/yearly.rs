//! Yearly events: recur on the same calendar date every year.
//!
//! A Feb 29 anchor clamps to Feb 28 in non-leap years and resumes Feb 29
//! when a leap year comes around.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::core::clock::{Clock, SystemClock};
use crate::core::event::{EventCore, Notifier, ScheduledEvent};
use crate::core::types::EventId;
use crate::events::{days_in_month, RecurrenceError};
use crate::scheduler::EventScheduler;

/// An event that recurs on the first occurrence's calendar date, yearly.
pub struct YearlyEvent {
    core: EventCore,
    month: u32,
    day: u32,
}

impl YearlyEvent {
    /// First firing at `first_occurrence`; thereafter on the same month and
    /// day, at the same time of day, every year.
    ///
    /// Fails with [`RecurrenceError::PastReference`] unless
    /// `first_occurrence` is strictly in the future.
    pub fn new(first_occurrence: DateTime<Utc>) -> Result<Self, RecurrenceError> {
        Self::with_clock(first_occurrence, Arc::new(SystemClock))
    }

    /// [`new`](Self::new) with a custom clock.
    pub fn with_clock(
        first_occurrence: DateTime<Utc>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        if first_occurrence <= clock.now() {
            return Err(RecurrenceError::PastReference(first_occurrence));
        }
        Ok(Self {
            month: first_occurrence.month(),
            day: first_occurrence.day(),
            core: EventCore::new(first_occurrence, clock),
        })
    }

    /// Attach a callback invoked, with no arguments, on every trigger.
    pub fn with_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.core.notifier_mut().set_callback(Box::new(callback));
        self
    }

    /// The first year after the current due moment whose (clamped)
    /// occurrence is strictly in the future.
    fn advance(&self) -> DateTime<Utc> {
        let now = self.core.now();
        let due = self.core.due();
        let time = due.time();
        let mut year = due.year();
        loop {
            year += 1;
            let day = self.day.min(days_in_month(year, self.month));
            let candidate = NaiveDate::from_ymd_opt(year, self.month, day)
                .expect("clamped day is valid for the month")
                .and_time(time)
                .and_utc();
            if candidate > now {
                return candidate;
            }
        }
    }
}

#[async_trait]
impl ScheduledEvent for YearlyEvent {
    fn due_at(&self) -> DateTime<Utc> {
        self.core.due()
    }

    async fn trigger(self: Arc<Self>, scheduler: &EventScheduler) {
        self.core.fire(scheduler).await;
        self.core.set_due(self.advance());
        super::resubmit(self, scheduler).await;
    }

    fn notifier(&self) -> &Notifier {
        self.core.notifier()
    }

    fn id(&self) -> EventId {
        self.core.id()
    }

    fn kind(&self) -> &'static str {
        "yearly"
    }
}
