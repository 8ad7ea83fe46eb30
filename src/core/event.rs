//! The event contract and shared trigger machinery.
//!
//! Every recurrence kind implements [`ScheduledEvent`]: a due moment, a
//! trigger action, and a notification surface. Trigger notifications are
//! delivered through two independent paths, a registered observer list and
//! an optional callback attached at construction. Both fire once per
//! trigger, in unspecified relative order.

use std::sync::Arc;
use std::sync::RwLock as StdRwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::core::clock::Clock;
use crate::core::types::EventId;
use crate::scheduler::EventScheduler;

/// Context handed to trigger observers.
pub struct TriggerContext<'a> {
    /// The scheduler that triggered the event.
    pub scheduler: &'a EventScheduler,
    /// The event that fired.
    pub event_id: EventId,
    /// The due moment that came due.
    pub due: DateTime<Utc>,
    /// The moment the trigger ran.
    pub fired_at: DateTime<Utc>,
}

/// Observer notified each time an event fires.
#[async_trait]
pub trait TriggerObserver: Send + Sync {
    /// Handle one trigger of the event this observer is registered on.
    async fn on_trigger(&self, ctx: &TriggerContext<'_>);
}

/// Callback attached at construction, invoked with no arguments once per
/// trigger.
pub type TriggerCallback = Box<dyn Fn() + Send + Sync>;

/// Trigger notification surface of a single event.
///
/// Holds the observer list and the optional callback. Observers can be
/// registered at any time through a shared event handle; the callback is
/// fixed at construction.
pub struct Notifier {
    observers: RwLock<Vec<Arc<dyn TriggerObserver>>>,
    callback: Option<TriggerCallback>,
}

impl Notifier {
    /// Create a notifier with no observers and no callback.
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            callback: None,
        }
    }

    /// Attach the construction-time callback.
    pub fn set_callback(&mut self, callback: TriggerCallback) {
        self.callback = Some(callback);
    }

    /// Register an observer for this event's triggers.
    pub async fn register(&self, observer: Arc<dyn TriggerObserver>) {
        let mut observers = self.observers.write().await;
        observers.push(observer);
    }

    /// Number of registered observers.
    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Deliver one trigger to every observer and to the callback.
    ///
    /// Observers run against a snapshot of the list, so an observer may
    /// register further observers without deadlocking against this
    /// delivery; additions take effect from the next trigger.
    pub(crate) async fn notify(&self, ctx: &TriggerContext<'_>) {
        let observers = self.observers.read().await.clone();
        for observer in observers.iter() {
            observer.on_trigger(ctx).await;
        }
        if let Some(callback) = &self.callback {
            callback();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// An entry the scheduler can queue and trigger.
///
/// Implementations are shared handles (`Arc`): the caller keeps one for
/// cancellation and observer registration, the queue holds one for due
/// ordering. The due moment is advanced only by the event itself, never by
/// the queue or the driver.
#[async_trait]
pub trait ScheduledEvent: Send + Sync {
    /// The moment this event is next due to trigger.
    fn due_at(&self) -> DateTime<Utc>;

    /// Fire this event's notifications. Recurring kinds then advance their
    /// due moment and resubmit the same handle through `scheduler`.
    async fn trigger(self: Arc<Self>, scheduler: &EventScheduler);

    /// Observer registration point for this event's trigger notifications.
    fn notifier(&self) -> &Notifier;

    /// Identifier used in logs and lifecycle notifications.
    fn id(&self) -> EventId;

    /// Short label for the recurrence kind (e.g. `"daily"`).
    fn kind(&self) -> &'static str;
}

/// State shared by every event variant: the mutable due moment, the
/// notifier, the id, and the clock the variant computes "now" from.
pub(crate) struct EventCore {
    id: EventId,
    due: StdRwLock<DateTime<Utc>>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl EventCore {
    pub(crate) fn new(due: DateTime<Utc>, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: EventId::new(),
            due: StdRwLock::new(due),
            notifier: Notifier::new(),
            clock,
        }
    }

    pub(crate) fn id(&self) -> EventId {
        self.id
    }

    pub(crate) fn due(&self) -> DateTime<Utc> {
        *self.due.read().expect("due lock poisoned")
    }

    pub(crate) fn set_due(&self, due: DateTime<Utc>) {
        *self.due.write().expect("due lock poisoned") = due;
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub(crate) fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Deliver this event's trigger notifications for the current due
    /// moment. Called by variants before they advance the due moment.
    pub(crate) async fn fire(&self, scheduler: &EventScheduler) {
        let ctx = TriggerContext {
            scheduler,
            event_id: self.id,
            due: self.due(),
            fired_at: self.clock.now(),
        };
        self.notifier.notify(&ctx).await;
    }
}
