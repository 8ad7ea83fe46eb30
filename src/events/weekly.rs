//! Weekly events: an ordered ring of (day-of-week, time-of-day) slots.
//!
//! Each computation picks the first slot strictly after the reference
//! moment in (weekday, time-of-day) order, wrapping to the earliest slot,
//! one week out, once the reference is past every slot in the current
//! week. A single-slot event is simply a one-element ring.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};

use crate::core::clock::{Clock, SystemClock};
use crate::core::event::{EventCore, Notifier, ScheduledEvent};
use crate::core::types::EventId;
use crate::events::{time_of_day, RecurrenceError};
use crate::scheduler::EventScheduler;

/// One (day-of-week, time-of-day) slot in a weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySlot {
    weekday: Weekday,
    time: NaiveTime,
}

impl WeeklySlot {
    /// Build a slot, validating the time-of-day components.
    pub fn new(
        weekday: Weekday,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, RecurrenceError> {
        Ok(Self {
            weekday,
            time: time_of_day(hour, minute, second)?,
        })
    }

    /// The slot's day of week.
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// The slot's time of day.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Sort key: Monday-based day number, then time of day.
    fn ordinal(&self) -> (u32, NaiveTime) {
        (self.weekday.num_days_from_monday(), self.time)
    }
}

/// An event that recurs on a weekly ring of slots.
pub struct WeeklyEvent {
    core: EventCore,
    slots: Vec<WeeklySlot>,
}

impl WeeklyEvent {
    /// Fire on every slot, week after week, starting with the first slot
    /// after now.
    ///
    /// Fails with [`RecurrenceError::EmptySlots`] when `slots` is empty.
    pub fn new(slots: Vec<WeeklySlot>) -> Result<Self, RecurrenceError> {
        Self::with_clock(slots, Arc::new(SystemClock))
    }

    /// [`new`](Self::new) with a custom clock.
    pub fn with_clock(
        slots: Vec<WeeklySlot>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        let start = clock.now();
        Self::build(slots, start, clock)
    }

    /// Single-slot convenience constructor.
    pub fn single(
        weekday: Weekday,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, RecurrenceError> {
        Self::new(vec![WeeklySlot::new(weekday, hour, minute, second)?])
    }

    /// Compute the first occurrence from `start` rather than from now.
    ///
    /// A `start` already in the past is clamped to now.
    pub fn starting_at(
        slots: Vec<WeeklySlot>,
        start: DateTime<Utc>,
    ) -> Result<Self, RecurrenceError> {
        Self::starting_at_with_clock(slots, start, Arc::new(SystemClock))
    }

    /// [`starting_at`](Self::starting_at) with a custom clock.
    pub fn starting_at_with_clock(
        slots: Vec<WeeklySlot>,
        start: DateTime<Utc>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        let reference = start.max(clock.now());
        Self::build(slots, reference, clock)
    }

    /// Attach a callback invoked, with no arguments, on every trigger.
    pub fn with_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.core.notifier_mut().set_callback(Box::new(callback));
        self
    }

    /// The slots, in (weekday, time-of-day) order.
    pub fn slots(&self) -> &[WeeklySlot] {
        &self.slots
    }

    fn build(
        mut slots: Vec<WeeklySlot>,
        reference: DateTime<Utc>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RecurrenceError> {
        if slots.is_empty() {
            return Err(RecurrenceError::EmptySlots);
        }
        slots.sort_by_key(WeeklySlot::ordinal);
        let due = next_slot_occurrence(&slots, reference);
        Ok(Self {
            core: EventCore::new(due, clock),
            slots,
        })
    }
}

/// The occurrence of the first slot strictly after `reference` in
/// (weekday, time-of-day) order. `slots` must be sorted and non-empty.
fn next_slot_occurrence(slots: &[WeeklySlot], reference: DateTime<Utc>) -> DateTime<Utc> {
    let reference_day = reference.weekday().num_days_from_monday();
    let reference_time = reference.time();

    let upcoming = slots.iter().find(|slot| {
        let day = slot.weekday.num_days_from_monday();
        day > reference_day || (day == reference_day && slot.time > reference_time)
    });
    let (slot, wrapped) = match upcoming {
        Some(slot) => (slot, false),
        // Past every slot this week: wrap to the earliest, one week out.
        None => (&slots[0], true),
    };

    let mut days_ahead =
        i64::from(slot.weekday.num_days_from_monday()) - i64::from(reference_day);
    if wrapped {
        days_ahead += 7;
    }
    (reference.date_naive() + Duration::days(days_ahead))
        .and_time(slot.time)
        .and_utc()
}

#[async_trait]
impl ScheduledEvent for WeeklyEvent {
    fn due_at(&self) -> DateTime<Utc> {
        self.core.due()
    }

    async fn trigger(self: Arc<Self>, scheduler: &EventScheduler) {
        self.core.fire(scheduler).await;
        self.core
            .set_due(next_slot_occurrence(&self.slots, self.core.now()));
        super::resubmit(self, scheduler).await;
    }

    fn notifier(&self) -> &Notifier {
        self.core.notifier()
    }

    fn id(&self) -> EventId {
        self.core.id()
    }

    fn kind(&self) -> &'static str {
        "weekly"
    }
}
