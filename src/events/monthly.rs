//! Monthly events: recur on an anchored day-of-month.
//!
//! The anchor day comes from the first occurrence. When a target month is
//! too short the occurrence clamps to that month's last day; the anchor is
//! kept, so the event resumes the anchor day in the next month long enough
//! to hold it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::core::clock::{Clock, SystemClock};
use crate::core::event::{EventCore, Notifier, ScheduledEvent};
use crate::core::types::EventId;
use crate::events::{days_in_month, RecurrenceError};
use crate::scheduler::EventScheduler;

/// An event that recurs monthly on the first occurrence's day-of-month.
pub struct MonthlyEvent {
    core: EventCore,
    day_of_month: u32,
}

impl MonthlyEvent {
    /// First firing at `first_occurrence`; thereafter on the same
    /// day-of-month, at the same time of day, every month.
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
            day_of_month: first_occurrence.day(),
            core: EventCore::new(first_occurrence, clock),
        })
    }

    /// Attach a callback invoked, with no arguments, on every trigger.
    pub fn with_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.core.notifier_mut().set_callback(Box::new(callback));
        self
    }

    /// The anchored day-of-month.
    pub fn day_of_month(&self) -> u32 {
        self.day_of_month
    }

    /// The first month after the current due moment whose (clamped)
    /// occurrence is strictly in the future.
    fn advance(&self) -> DateTime<Utc> {
        let now = self.core.now();
        let due = self.core.due();
        let time = due.time();
        let (mut year, mut month) = (due.year(), due.month());
        loop {
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
            let day = self.day_of_month.min(days_in_month(year, month));
            let candidate = NaiveDate::from_ymd_opt(year, month, day)
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
impl ScheduledEvent for MonthlyEvent {
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
        "monthly"
    }
}
