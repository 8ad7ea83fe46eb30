//! Lifecycle notifications for scheduler activity.
//!
//! The driver reports submissions, triggers, and cancellations to
//! registered sinks. Sinks are informational collaborators (console or
//! log output); core correctness never depends on them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::core::types::EventId;

/// Scheduler lifecycle notifications.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// An event was accepted into the queue.
    Scheduled {
        id: EventId,
        kind: &'static str,
        due: DateTime<Utc>,
    },

    /// An event came due and fired.
    Triggered {
        id: EventId,
        kind: &'static str,
        due: DateTime<Utc>,
        /// The poll timestamp that observed the event as due.
        at: DateTime<Utc>,
    },

    /// A queued event was removed by cancellation.
    Cancelled {
        id: EventId,
        kind: &'static str,
        due: DateTime<Utc>,
    },
}

/// Receiver for scheduler lifecycle notifications.
#[async_trait]
pub trait SchedulerSink: Send + Sync {
    /// Handle one notification.
    async fn handle(&self, event: &SchedulerEvent);
}

/// Distributes lifecycle notifications to registered sinks.
pub struct SinkRegistry {
    sinks: RwLock<Vec<Arc<dyn SchedulerSink>>>,
}

impl SinkRegistry {
    /// Create a registry with no sinks.
    pub fn new() -> Self {
        Self {
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Register a sink.
    pub async fn register(&self, sink: Arc<dyn SchedulerSink>) {
        let mut sinks = self.sinks.write().await;
        sinks.push(sink);
    }

    /// Number of registered sinks.
    pub async fn sink_count(&self) -> usize {
        self.sinks.read().await.len()
    }

    /// Emit a notification to every registered sink.
    ///
    /// Sinks run against a snapshot of the registry, so a sink may register
    /// further sinks or call back into the scheduler without deadlocking
    /// against this delivery.
    pub(crate) async fn emit(&self, event: SchedulerEvent) {
        let sinks = self.sinks.read().await.clone();
        for sink in sinks.iter() {
            sink.handle(&event).await;
        }
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Sink that prints one line per notification, as a console audit trail.
pub struct ConsoleSink;

#[async_trait]
impl SchedulerSink for ConsoleSink {
    async fn handle(&self, event: &SchedulerEvent) {
        match event {
            SchedulerEvent::Scheduled { id, kind, due } => {
                println!("{} : scheduled new {kind} event {id} @ {due}", Utc::now());
            }
            SchedulerEvent::Triggered { id, kind, .. } => {
                println!("{} : {kind} event {id} triggered", Utc::now());
            }
            SchedulerEvent::Cancelled { id, kind, due } => {
                println!(
                    "{} : cancelled {kind} event {id} previously scheduled @ {due}",
                    Utc::now()
                );
            }
        }
    }
}
