//! Event variants: the recurrence kinds accepted by the scheduler.
//!
//! Each variant encapsulates its own "compute next due moment" rule and
//! implements [`ScheduledEvent`](crate::core::event::ScheduledEvent), so
//! the queue and the driver treat all kinds uniformly. Recurring variants
//! resubmit themselves through the driver at the end of their own trigger.
//!
//! Every computed due moment is strictly in the future at computation time:
//! when the naive next occurrence already lies in the past (e.g. the
//! process slept through it), the variant advances by whole recurrence
//! periods until it lands ahead of now.

mod daily;
mod interval;
mod monthly;
mod one_shot;
mod weekly;
mod yearly;

pub use daily::DailyEvent;
pub use interval::IntervalEvent;
pub use monthly::MonthlyEvent;
pub use one_shot::OneShotEvent;
pub use weekly::{WeeklyEvent, WeeklySlot};
pub use yearly::YearlyEvent;

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::core::event::ScheduledEvent;
use crate::scheduler::EventScheduler;

/// Errors raised by event constructors on invalid recurrence parameters.
///
/// Construction fails fast; no partially-built event escapes.
#[derive(Debug, Error)]
pub enum RecurrenceError {
    /// Time-of-day components out of range.
    #[error("invalid time of day: {hour:02}:{minute:02}:{second:02}")]
    InvalidTimeOfDay { hour: u32, minute: u32, second: u32 },

    /// A weekly event needs at least one slot.
    #[error("a weekly event requires at least one slot")]
    EmptySlots,

    /// A reference moment that must be in the future was not.
    #[error("reference moment is not in the future: {0}")]
    PastReference(DateTime<Utc>),

    /// A recurrence period that is zero or beyond the representable range.
    #[error("invalid recurrence period: {0:?}")]
    InvalidPeriod(std::time::Duration),
}

/// Validate raw components and build a time-of-day.
pub(crate) fn time_of_day(
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<NaiveTime, RecurrenceError> {
    NaiveTime::from_hms_opt(hour, minute, second).ok_or(RecurrenceError::InvalidTimeOfDay {
        hour,
        minute,
        second,
    })
}

/// Number of days in the given month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first of month is a valid date")
        .pred_opt()
        .expect("first of month has a predecessor")
        .day()
}

/// Re-queue a recurring event after its trigger advanced the due moment.
///
/// A rejected resubmission is logged and dropped; it must not unwind into
/// the drain loop.
pub(crate) async fn resubmit(event: Arc<dyn ScheduledEvent>, scheduler: &EventScheduler) {
    let id = event.id();
    let kind = event.kind();
    if let Err(error) = scheduler.submit(event).await {
        tracing::warn!(%id, kind, %error, "failed to reschedule recurring event");
    }
}
