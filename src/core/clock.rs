//! Time source abstraction.
//!
//! The scheduler and every event variant read the current moment through
//! [`Clock`], so tests can simulate time passage without real delays.

use chrono::{DateTime, Utc};

/// A source of the current timestamp.
pub trait Clock: Send + Sync {
    /// The current moment.
    fn now(&self) -> DateTime<Utc>;
}

/// The default clock, backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
