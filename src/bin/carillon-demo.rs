//! Carillon demo - schedules a handful of events and lets the driver run.
//!
//! Usage:
//!   carillon-demo
//!
//! Logs are controlled through RUST_LOG (e.g. RUST_LOG=carillon=debug).

use std::sync::Arc;
use std::time::Duration;

use carillon::{ConsoleSink, EventScheduler, IntervalEvent, OneShotEvent, WeeklyEvent};
use chrono::{Utc, Weekday};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("started");
    let (scheduler, driver) = EventScheduler::new().start();
    scheduler.register_sink(Arc::new(ConsoleSink)).await;

    let reminder = Arc::new(
        OneShotEvent::new(Utc::now() + chrono::Duration::seconds(5))
            .expect("five seconds from now is in the future")
            .with_callback(|| println!("one-shot fired")),
    );
    scheduler
        .submit(reminder)
        .await
        .expect("reminder is in the future");

    let heartbeat = Arc::new(
        IntervalEvent::new(Duration::from_secs(15))
            .expect("period is non-zero")
            .with_callback(|| println!("heartbeat")),
    );
    scheduler
        .submit(heartbeat)
        .await
        .expect("heartbeat is in the future");

    let saturday = Arc::new(
        WeeklyEvent::single(Weekday::Sat, 15, 35, 30)
            .expect("slot is valid")
            .with_callback(|| println!("saturday afternoon")),
    );
    scheduler
        .submit(saturday)
        .await
        .expect("weekly slot is in the future");

    // The driver runs for the process lifetime; wait on it until killed.
    driver.await.ok();
}
