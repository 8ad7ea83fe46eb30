//! Scheduler engine implementation.
//!
//! The driver owns the due-ordered queue, accepts submissions and
//! cancellations from any task, and polls the queue on a fixed cadence.
//! Each poll cycle captures one timestamp and triggers every event due by
//! it, in ascending due order. Recurring events resubmit themselves through
//! the same driver during their own trigger.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::core::clock::{Clock, SystemClock};
use crate::core::event::ScheduledEvent;
use crate::core::queue::EventQueue;
use crate::scheduler::sink::{SchedulerEvent, SchedulerSink, SinkRegistry};

/// Default poll cadence.
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Errors surfaced by the driver.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The event's due moment is not strictly in the future.
    #[error("cannot schedule an event due at {due}; it is not after {now}")]
    InvalidSchedule {
        due: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

/// The scheduling driver.
///
/// Created once and shared (`Arc`) between the poll loop, callers, and the
/// events themselves: a recurring event's trigger receives `&EventScheduler`
/// and resubmits the same handle, so observer registrations survive across
/// occurrences.
pub struct EventScheduler {
    queue: Mutex<EventQueue>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    sinks: SinkRegistry,
}

impl EventScheduler {
    /// Create a driver with the default 1000 ms poll cadence and the
    /// system clock.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(EventQueue::new()),
            clock: Arc::new(SystemClock),
            tick_interval: DEFAULT_TICK_INTERVAL,
            sinks: SinkRegistry::new(),
        }
    }

    /// Set the poll cadence.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register a lifecycle sink.
    pub async fn register_sink(&self, sink: Arc<dyn SchedulerSink>) {
        self.sinks.register(sink).await;
    }

    /// Submit an event for triggering at its due moment.
    ///
    /// Fails with [`SchedulerError::InvalidSchedule`] unless the due moment
    /// is strictly in the future at the moment of submission; on failure
    /// the queue is unchanged.
    pub async fn submit(&self, event: Arc<dyn ScheduledEvent>) -> Result<(), SchedulerError> {
        let due = event.due_at();
        let now = self.clock.now();
        if due <= now {
            return Err(SchedulerError::InvalidSchedule { due, now });
        }

        let id = event.id();
        let kind = event.kind();
        {
            let mut queue = self.queue.lock().await;
            queue.insert(event);
        }
        tracing::debug!(%id, kind, %due, "event scheduled");
        self.sinks
            .emit(SchedulerEvent::Scheduled { id, kind, due })
            .await;
        Ok(())
    }

    /// Cancel a queued event, located by reference identity.
    ///
    /// Returns whether the event was removed. `false` means the event was
    /// not queued (already triggered, already cancelled, or never
    /// submitted), which is not an error.
    ///
    /// Cancelling concurrently with the event's own trigger is
    /// race-dependent: a recurring event that is mid-trigger is not in the
    /// queue, so the cancel returns `false` and the event re-queues itself
    /// anyway; once the resubmission has landed, the cancel removes the
    /// re-queued entry. Callers that must stop a recurring event should
    /// retry until the cancel reports `true`.
    pub async fn cancel(&self, event: &Arc<dyn ScheduledEvent>) -> bool {
        let removed = {
            let mut queue = self.queue.lock().await;
            queue.remove(event)
        };
        if removed {
            let id = event.id();
            let kind = event.kind();
            let due = event.due_at();
            tracing::debug!(%id, kind, %due, "event cancelled");
            self.sinks
                .emit(SchedulerEvent::Cancelled { id, kind, due })
                .await;
        }
        removed
    }

    /// Number of events currently queued.
    pub async fn queued(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Run one poll cycle at the clock's current moment; returns the number
    /// of events triggered.
    ///
    /// The cycle captures a single timestamp and fires every queued event
    /// due by it, each exactly once, in ascending due order, even a
    /// backlog accumulated over a long pause. The queue lock is held only
    /// while popping one element, so submissions and cancellations
    /// interleave freely with a long drain, and an event resubmitting
    /// itself from inside its own trigger does not deadlock.
    pub async fn poll_once(&self) -> usize {
        self.poll_at(self.clock.now()).await
    }

    async fn poll_at(&self, now: DateTime<Utc>) -> usize {
        let mut triggered = 0;
        loop {
            let due_event = {
                let mut queue = self.queue.lock().await;
                match queue.peek() {
                    Some(event) if event.due_at() <= now => queue.pop(),
                    _ => None,
                }
            };
            let Some(event) = due_event else {
                break;
            };

            let id = event.id();
            let kind = event.kind();
            let due = event.due_at();
            tracing::info!(%id, kind, %due, "event triggered");
            self.sinks
                .emit(SchedulerEvent::Triggered { id, kind, due, at: now })
                .await;

            // A misbehaving observer or callback loses only this event's
            // trigger (and, for recurring kinds, its resubmission); the
            // remaining due events still fire and the queue stays intact.
            if AssertUnwindSafe(event.trigger(self))
                .catch_unwind()
                .await
                .is_err()
            {
                tracing::warn!(%id, kind, "event trigger panicked");
            }
            triggered += 1;
        }
        triggered
    }

    /// Start the poll loop, returning the shared driver and the loop task.
    ///
    /// The loop runs for the process lifetime; there is no stop token in
    /// the core. Higher layers that need to halt it can abort the returned
    /// [`JoinHandle`].
    pub fn start(self) -> (Arc<Self>, JoinHandle<()>) {
        let scheduler = Arc::new(self);
        let driver = Arc::clone(&scheduler);
        let task = tokio::spawn(async move {
            driver.run().await;
        });
        (scheduler, task)
    }

    /// Main poll loop.
    async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            interval.tick().await;
            self.poll_once().await;
        }
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
