//! carillon: an in-process event scheduler.
//!
//! Callers construct events (one-shot or one of five recurring kinds) and
//! submit them to an [`EventScheduler`]. A background driver polls a
//! due-ordered queue on a fixed cadence and triggers every event whose due
//! moment has passed, in time order. Recurring events recompute their next
//! due moment after every trigger and resubmit themselves, so one handle
//! keeps firing (and keeps its observers) across occurrences.
//!
//! All state is in memory; nothing survives a process restart.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use carillon::{EventScheduler, IntervalEvent, OneShotEvent};
//! use chrono::Utc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (scheduler, _driver) = EventScheduler::new().start();
//!
//! let reminder = Arc::new(
//!     OneShotEvent::new(Utc::now() + chrono::Duration::seconds(5))?
//!         .with_callback(|| println!("five seconds are up")),
//! );
//! scheduler.submit(reminder).await?;
//!
//! let heartbeat = Arc::new(
//!     IntervalEvent::new(Duration::from_secs(15))?.with_callback(|| println!("tick")),
//! );
//! scheduler.submit(heartbeat).await?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod events;
pub mod scheduler;
pub mod testing;

pub use crate::core::clock::{Clock, SystemClock};
pub use crate::core::event::{
    Notifier, ScheduledEvent, TriggerCallback, TriggerContext, TriggerObserver,
};
pub use crate::core::queue::EventQueue;
pub use crate::core::types::EventId;
pub use crate::events::{
    DailyEvent, IntervalEvent, MonthlyEvent, OneShotEvent, RecurrenceError, WeeklyEvent,
    WeeklySlot, YearlyEvent,
};
pub use crate::scheduler::sink::{ConsoleSink, SchedulerEvent, SchedulerSink, SinkRegistry};
pub use crate::scheduler::{EventScheduler, SchedulerError};
