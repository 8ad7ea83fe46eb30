//! One-shot events: trigger once at a fixed moment, never recur.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::clock::{Clock, SystemClock};
use crate::core::event::{EventCore, Notifier, ScheduledEvent};
use crate::core::types::EventId;
use crate::events::RecurrenceError;
use crate::scheduler::EventScheduler;

/// An event that fires exactly once, at a fixed moment.
pub struct OneShotEvent {
    core: EventCore,
}

impl OneShotEvent {
    /// Create a one-shot event due at `at`.
    ///
    /// Fails with [`RecurrenceError::PastReference`] unless `at` is
    /// strictly in the future.
    pub fn new(at: DateTime<Utc>) -> Result<Self, RecurrenceError> {
        Self::with_clock(at, Arc::new(SystemClock))
    }

    /// Create a one-shot event reading time from a custom clock.
    pub fn with_clock(at: DateTime<Utc>, clock: Arc<dyn Clock>) -> Result<Self, RecurrenceError> {
        if at <= clock.now() {
            return Err(RecurrenceError::PastReference(at));
        }
        Ok(Self {
            core: EventCore::new(at, clock),
        })
    }

    /// Attach a callback invoked, with no arguments, when the event fires.
    pub fn with_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.core.notifier_mut().set_callback(Box::new(callback));
        self
    }
}

#[async_trait]
impl ScheduledEvent for OneShotEvent {
    fn due_at(&self) -> DateTime<Utc> {
        self.core.due()
    }

    async fn trigger(self: Arc<Self>, scheduler: &EventScheduler) {
        self.core.fire(scheduler).await;
    }

    fn notifier(&self) -> &Notifier {
        self.core.notifier()
    }

    fn id(&self) -> EventId {
        self.core.id()
    }

    fn kind(&self) -> &'static str {
        "one_shot"
    }
}
